mod debug;

pub mod error;
pub mod instruction;
pub mod io;
pub mod mem;
pub mod regs;
pub mod screen;
pub mod stack;
pub mod timers;

use self::error::{Error, Result};
use self::instruction::{Instruction, Reg};
use self::io::InputDevice;
use self::mem::MemoryBank;
use self::regs::RegisterFile;
use self::screen::{FrameBuffer, Point};
use self::stack::CallStack;
use self::timers::Timers;
use log::{debug, error, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// The whole emulated machine.
#[derive(Debug, Clone)]
pub struct Machine {
    regs: RegisterFile,
    stack: CallStack,
    mem: MemoryBank,
    screen: FrameBuffer,
    timers: Timers,
    rng: StdRng,
    state: State,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Running,
    /// Suspended by `FX0A`; the key goes into this register.
    WaitingForKey(Reg),
    /// Stopped by a fatal error. PC still points at the faulting instruction.
    Halted(Error),
}

/// What happened during one call to [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Executed,
    /// Blocked on `FX0A`. Keep calling `step` (e.g. once per frame) to poll
    /// for the key press.
    WaitingForKey,
    /// The opcode wasn't recognized and was treated as a no-op.
    Skipped { opcode: u16 },
}

impl Machine {
    /// Load `rom` at `0x200`. `CXNN` draws from an entropy-seeded generator.
    pub fn new(rom: &[u8]) -> Result<Self> {
        Self::with_rng(rom, StdRng::from_entropy())
    }

    /// Like [`Machine::new`], but with reproducible `CXNN` results.
    pub fn with_seed(rom: &[u8], seed: u64) -> Result<Self> {
        Self::with_rng(rom, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rom: &[u8], rng: StdRng) -> Result<Self> {
        let mem = MemoryBank::with_rom(rom)?;
        debug!("loaded {} byte ROM at 0x{:03x}", rom.len(), MemoryBank::ROM_START);

        Ok(Self {
            regs: RegisterFile::new(),
            stack: CallStack::new(),
            mem,
            screen: FrameBuffer::new(),
            timers: Timers::default(),
            rng,
            state: State::Running,
        })
    }

    /// Fetch, decode, and execute one instruction.
    ///
    /// While waiting on `FX0A`, this polls `input` for a key press instead;
    /// the press completes the wait without executing anything further.
    ///
    /// A fatal error halts the machine: this call and every later one return
    /// the error, and no state changes.
    pub fn step(&mut self, input: &mut dyn InputDevice) -> Result<StepStatus> {
        match self.state {
            State::Running => (),
            State::WaitingForKey(x) => return Ok(self.poll_key(x, input)),
            State::Halted(ref err) => return Err(err.clone()),
        }

        let pc = self.regs.pc;
        match self.fetch_and_execute(input) {
            Ok(status) => Ok(status),
            Err(Error::UnknownOpcode { opcode, pc }) => {
                warn!("skipping unknown opcode 0x{opcode:04x} at 0x{pc:03x}");
                Ok(StepStatus::Skipped { opcode })
            }
            Err(err) => {
                error!("halting at 0x{pc:03x}: {err}");
                self.regs.pc = pc;
                self.state = State::Halted(err.clone());
                Err(err)
            }
        }
    }

    /// One host frame: up to `cycles` steps, then one timer tick.
    ///
    /// Stops stepping early if the machine starts waiting for a key. Returns
    /// the status of the last step.
    pub fn run_frame(&mut self, cycles: u32, input: &mut dyn InputDevice) -> Result<StepStatus> {
        let mut status = if self.is_waiting_for_key() {
            StepStatus::WaitingForKey
        } else {
            StepStatus::Executed
        };

        for _ in 0..cycles {
            status = self.step(input)?;
            if status == StepStatus::WaitingForKey {
                break;
            }
        }

        self.tick_timers();
        Ok(status)
    }

    /// Count both timers down by one. Call once per frame.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.screen
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn memory(&self) -> &MemoryBank {
        &self.mem
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.state, State::WaitingForKey(_))
    }

    /// The fatal error that stopped the machine, if any.
    pub fn halted(&self) -> Option<&Error> {
        match &self.state {
            State::Halted(err) => Some(err),
            _ => None,
        }
    }

    fn poll_key(&mut self, x: Reg, input: &mut dyn InputDevice) -> StepStatus {
        let Some(key) = input.take_key_press() else {
            return StepStatus::WaitingForKey;
        };
        let key = key & 0xf;

        debug!("key 0x{key:x} pressed, resuming at 0x{:03x}", self.regs.pc);
        self.regs[x] = key;
        self.state = State::Running;
        StepStatus::Executed
    }

    fn fetch_and_execute(&mut self, input: &mut dyn InputDevice) -> Result<StepStatus> {
        let pc = self.regs.pc;
        let opcode = self.mem.read_word(pc)?;
        self.regs.pc += 2;

        let instr = Instruction::decode(opcode, pc)?;
        trace!("0x{pc:03x}: {opcode:04x}  {instr}");

        self.execute(instr, input)
    }

    /// Fallible instructions check everything before mutating, so an error
    /// leaves all state but PC untouched.
    fn execute(&mut self, instr: Instruction, input: &mut dyn InputDevice) -> Result<StepStatus> {
        use Instruction::*;

        let v = &mut self.regs;
        match instr {
            ClearScreen => self.screen.clear(),
            Return => v.pc = self.stack.pop()?,
            Jump(addr) => v.pc = addr,
            Call(addr) => {
                self.stack.push(v.pc)?;
                v.pc = addr;
            }
            SkipEqImm(x, nn) => self.skip_if(self.regs[x] == nn),
            SkipNeImm(x, nn) => self.skip_if(self.regs[x] != nn),
            SkipEq(x, y) => self.skip_if(self.regs[x] == self.regs[y]),
            SkipNe(x, y) => self.skip_if(self.regs[x] != self.regs[y]),
            LoadImm(x, nn) => v[x] = nn,
            AddImm(x, nn) => v[x] = v[x].wrapping_add(nn),
            Move(x, y) => v[x] = v[y],
            Or(x, y) => v[x] = v[x] | v[y],
            And(x, y) => v[x] = v[x] & v[y],
            Xor(x, y) => v[x] = v[x] ^ v[y],
            Add(x, y) => {
                let (sum, carry) = v[x].overflowing_add(v[y]);
                v[x] = sum;
                v.set_flag(carry);
            }
            Sub(x, y) => {
                let no_borrow = v[x] >= v[y];
                v[x] = v[x].wrapping_sub(v[y]);
                v.set_flag(no_borrow);
            }
            SubReversed(x, y) => {
                let no_borrow = v[y] >= v[x];
                v[x] = v[y].wrapping_sub(v[x]);
                v.set_flag(no_borrow);
            }
            ShiftRight(x, y) => {
                let src = v[y];
                v[x] = src >> 1;
                v.set_flag(src & 0x01 != 0);
            }
            ShiftLeft(x, y) => {
                let src = v[y];
                v[x] = src << 1;
                v.set_flag(src & 0x80 != 0);
            }
            LoadIndex(addr) => v.i = addr,
            JumpOffset(addr) => v.pc = addr + v[0] as u16,
            Random(x, nn) => v[x] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let sprite = self.mem.slice(v.i, n as usize)?;
                let top_left = Point::from((v[x], v[y]));
                let collision = self.screen.draw_sprite(top_left, sprite);
                v.set_flag(collision);
            }
            SkipKeyDown(x) => self.skip_if(input.is_key_down(self.regs[x] & 0xf)),
            SkipKeyUp(x) => self.skip_if(!input.is_key_down(self.regs[x] & 0xf)),
            ReadDelay(x) => v[x] = self.timers.delay,
            WaitKey(x) => {
                self.state = State::WaitingForKey(x);
                debug!("waiting for key into V{x:X}");
                // A press that's already pending completes the wait right away.
                return Ok(self.poll_key(x, input));
            }
            WriteDelay(x) => self.timers.delay = v[x],
            WriteSound(x) => self.timers.sound = v[x],
            AddIndex(x) => v.i = v.i.wrapping_add(v[x] as u16),
            Glyph(x) => v.i = MemoryBank::glyph_addr(v[x]),
            Bcd(x) => self.mem.load_bytes(v.i, &bcd_from_u8(v[x]))?,
            StoreRegs(x) => {
                let dst = self.mem.slice_mut(v.i, x as usize + 1)?;
                for reg in 0..=x {
                    dst[reg as usize] = v[reg];
                }
            }
            LoadRegs(x) => {
                let src = self.mem.slice(v.i, x as usize + 1)?;
                for reg in 0..=x {
                    v[reg] = src[reg as usize];
                }
            }
        }

        Ok(StepStatus::Executed)
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.regs.pc += 2;
        }
    }
}

/// Convert x to "big endian" binary coded decimal:
/// [hundreds, tens, ones]
fn bcd_from_u8(x: u8) -> [u8; 3] {
    [x / 100, x / 10 % 10, x % 10]
}
