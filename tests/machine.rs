use chip8_vm::{Error, FrameBuffer, InputDevice, Machine, Point, StepStatus};
use std::collections::VecDeque;

/// A keypad driven by the test.
#[derive(Debug, Default)]
struct Keypad {
    down: [bool; 16],
    presses: VecDeque<u8>,
}

impl Keypad {
    fn press(&mut self, key: u8) {
        self.down[key as usize] = true;
        self.presses.push_back(key);
    }
}

impl InputDevice for Keypad {
    fn is_key_down(&self, key: u8) -> bool {
        self.down[key as usize]
    }

    fn take_key_press(&mut self) -> Option<u8> {
        self.presses.pop_front()
    }
}

fn assemble(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn machine(words: &[u16]) -> Machine {
    Machine::with_seed(&assemble(words), 7).unwrap()
}

/// Step `n` times, expecting each instruction to execute normally.
fn run(m: &mut Machine, keys: &mut Keypad, n: usize) {
    for _ in 0..n {
        assert_eq!(m.step(keys), Ok(StepStatus::Executed));
    }
}

fn v(m: &Machine, x: u8) -> u8 {
    m.registers()[x]
}

/// Load `a` into VX and `b` into VY, then run `op`.
fn binary_op(x: u8, y: u8, a: u8, b: u8, op: u16) -> Machine {
    let x16 = x as u16;
    let y16 = y as u16;
    let mut m = machine(&[
        0x6000 | x16 << 8 | a as u16,
        0x6000 | y16 << 8 | b as u16,
        op | x16 << 8 | y16 << 4,
    ]);
    run(&mut m, &mut Keypad::default(), 3);
    m
}

#[test]
fn first_fetch_is_big_endian() {
    let mut m = Machine::new(&[0xa2, 0x34]).unwrap();
    assert_eq!(m.memory().read_word(0x200), Ok(0xa234));

    run(&mut m, &mut Keypad::default(), 1);
    assert_eq!(m.registers().i, 0x234);
    assert_eq!(m.registers().pc, 0x202);
}

#[test]
fn rom_too_large_is_rejected() {
    let rom = vec![0; 4096 - 0x200 + 1];
    assert!(matches!(
        Machine::new(&rom),
        Err(Error::RomTooLarge { size: 3585, max: 3584 })
    ));
}

#[test]
fn add_with_carry() {
    for (x, y) in [(0, 1), (3, 9), (0xe, 0x2)] {
        let m = binary_op(x, y, 250, 10, 0x8004);
        assert_eq!(v(&m, x), 4);
        assert_eq!(v(&m, 0xf), 1);

        let m = binary_op(x, y, 1, 1, 0x8004);
        assert_eq!(v(&m, x), 2);
        assert_eq!(v(&m, 0xf), 0);
    }
}

#[test]
fn sub_sets_not_borrow() {
    for (x, y) in [(0, 1), (5, 4), (0xe, 0xd)] {
        let m = binary_op(x, y, 5, 10, 0x8005);
        assert_eq!(v(&m, x), 251);
        assert_eq!(v(&m, 0xf), 0);

        let m = binary_op(x, y, 10, 5, 0x8005);
        assert_eq!(v(&m, x), 5);
        assert_eq!(v(&m, 0xf), 1);

        let m = binary_op(x, y, 7, 7, 0x8005);
        assert_eq!(v(&m, x), 0);
        assert_eq!(v(&m, 0xf), 1);
    }
}

#[test]
fn reversed_sub() {
    let m = binary_op(1, 2, 10, 5, 0x8007);
    assert_eq!(v(&m, 1), 251);
    assert_eq!(v(&m, 0xf), 0);

    let m = binary_op(1, 2, 5, 10, 0x8007);
    assert_eq!(v(&m, 1), 5);
    assert_eq!(v(&m, 0xf), 1);
}

#[test]
fn shifts_read_vy() {
    let m = binary_op(1, 2, 0xff, 0b0000_0101, 0x8006);
    assert_eq!(v(&m, 1), 0b10);
    assert_eq!(v(&m, 2), 0b101);
    assert_eq!(v(&m, 0xf), 1);

    let m = binary_op(1, 2, 0xff, 0b0000_0100, 0x8006);
    assert_eq!(v(&m, 1), 0b10);
    assert_eq!(v(&m, 0xf), 0);

    let m = binary_op(1, 2, 0, 0b1100_0001, 0x800e);
    assert_eq!(v(&m, 1), 0b1000_0010);
    assert_eq!(v(&m, 0xf), 1);

    let m = binary_op(1, 2, 0xff, 0b0100_0001, 0x800e);
    assert_eq!(v(&m, 1), 0b1000_0010);
    assert_eq!(v(&m, 0xf), 0);
}

#[test]
fn flag_written_last_when_vf_is_target() {
    let m = binary_op(0xf, 1, 200, 100, 0x8004);
    assert_eq!(v(&m, 0xf), 1);
}

#[test]
fn bitwise_ops_leave_vf_alone() {
    let mut m = machine(&[0x6f07, 0x6106, 0x6203, 0x8121, 0x8322, 0x8123]);
    run(&mut m, &mut Keypad::default(), 6);
    assert_eq!(v(&m, 1), 0x07 ^ 0x03);
    assert_eq!(v(&m, 3), 0);
    assert_eq!(v(&m, 0xf), 7);
}

#[test]
fn add_immediate_wraps_without_flag() {
    let mut m = machine(&[0x61f0, 0x7120]);
    run(&mut m, &mut Keypad::default(), 2);
    assert_eq!(v(&m, 1), 0x10);
    assert_eq!(v(&m, 0xf), 0);
}

#[test]
fn skips() {
    // V1 := 3; V2 := 3; then each skip guards an `ADD V0, 1`.
    let mut m = machine(&[
        0x6103, 0x6203, //
        0x3103, 0x7001, // taken
        0x4103, 0x7001, // not taken
        0x5120, 0x7001, // taken
        0x9120, 0x7001, // not taken
    ]);
    let mut keys = Keypad::default();
    run(&mut m, &mut keys, 8);
    assert_eq!(v(&m, 0), 2);
    assert_eq!(m.registers().pc, 0x214);
}

#[test]
fn call_then_return() {
    // 0x200: CALL 0x206; 0x202: JP 0x202; 0x204: pad; 0x206: RET
    let mut m = machine(&[0x2206, 0x1202, 0x0000, 0x00ee]);
    let mut keys = Keypad::default();

    run(&mut m, &mut keys, 1);
    assert_eq!(m.registers().pc, 0x206);
    assert_eq!(m.stack_depth(), 1);

    run(&mut m, &mut keys, 1);
    assert_eq!(m.registers().pc, 0x202);
    assert_eq!(m.stack_depth(), 0);
}

#[test]
fn sixteen_nested_calls_then_overflow() {
    // Every call lands on the next instruction, which is another call.
    let words: Vec<u16> = (0..17).map(|i| 0x2000 | (0x202 + 2 * i)).collect();
    let mut m = machine(&words);
    let mut keys = Keypad::default();

    run(&mut m, &mut keys, 16);
    assert_eq!(m.stack_depth(), 16);
    assert_eq!(m.registers().pc, 0x220);

    let err = m.step(&mut keys).unwrap_err();
    assert_eq!(err, Error::StackOverflow { capacity: 16 });
    assert!(err.is_fatal());
    assert_eq!(m.registers().pc, 0x220);
    assert_eq!(m.stack_depth(), 16);
    assert_eq!(m.step(&mut keys), Err(err));
}

#[test]
fn jumps() {
    let mut m = machine(&[0x1206, 0x0000, 0x0000, 0x6004, 0xb300]);
    run(&mut m, &mut Keypad::default(), 3);
    assert_eq!(m.registers().pc, 0x304);
}

#[test]
fn unknown_opcode_is_skipped() {
    let mut m = machine(&[0x0123, 0x6142]);
    let mut keys = Keypad::default();

    assert_eq!(m.step(&mut keys), Ok(StepStatus::Skipped { opcode: 0x0123 }));
    assert_eq!(m.registers().pc, 0x202);
    assert!(m.halted().is_none());

    run(&mut m, &mut keys, 1);
    assert_eq!(v(&m, 1), 0x42);
}

#[test]
fn bcd() {
    let mut m = machine(&[0x6c9d, 0xa300, 0xfc33]);
    run(&mut m, &mut Keypad::default(), 3);
    assert_eq!(m.memory().slice(0x300, 3), Ok(&[1, 5, 7][..]));
    assert_eq!(m.registers().i, 0x300);
}

#[test]
fn store_and_load_registers() {
    let mut m = machine(&[
        0x6011, 0x6122, 0x6233, 0x6344, // V0..=V3
        0xa400, 0xf255, // store V0..=V2
        0x6000, 0x6100, 0x6200, 0x6300, //
        0xf365, // load V0..=V3
    ]);
    run(&mut m, &mut Keypad::default(), 11);

    assert_eq!(m.memory().slice(0x400, 4), Ok(&[0x11, 0x22, 0x33, 0x00][..]));
    assert_eq!(m.registers().i, 0x400);
    assert_eq!((0..4).map(|x| v(&m, x)).collect::<Vec<_>>(), [0x11, 0x22, 0x33, 0]);
}

#[test]
fn index_arithmetic_and_glyphs() {
    let mut m = machine(&[0xa100, 0x6520, 0xf51e, 0x650b, 0xf529]);
    let mut keys = Keypad::default();

    run(&mut m, &mut keys, 3);
    assert_eq!(m.registers().i, 0x120);
    run(&mut m, &mut keys, 2);
    assert_eq!(m.registers().i, 0x0b * 5);
    assert_eq!(
        m.memory().slice(m.registers().i, 5),
        Ok(&[0xE0, 0x90, 0xE0, 0x90, 0xE0][..])
    );
}

#[test]
fn draw_twice_erases_and_collides() {
    // I := glyph 0; V0 := 10; V1 := 5; draw twice.
    let mut m = machine(&[0x6000, 0xf029, 0x600a, 0x6105, 0xd015, 0xd015]);
    let mut keys = Keypad::default();

    run(&mut m, &mut keys, 5);
    assert_eq!(v(&m, 0xf), 0);
    assert!(m.frame_buffer().pixel(Point { x: 10, y: 5 }));
    assert!(!m.frame_buffer().pixel(Point { x: 11, y: 6 }));

    run(&mut m, &mut keys, 1);
    assert_eq!(v(&m, 0xf), 1);
    assert_eq!(m.frame_buffer(), &FrameBuffer::new());
}

#[test]
fn draw_wraps_and_clear() {
    // V0 := 63; V1 := 31; I := glyph 8 (0xF0 top row); draw 1 row; CLS.
    let mut m = machine(&[0x603f, 0x611f, 0xa028, 0xd011, 0x00e0]);
    let mut keys = Keypad::default();

    run(&mut m, &mut keys, 4);
    let fb = m.frame_buffer();
    for x in [63, 0, 1, 2] {
        assert!(fb.pixel(Point { x, y: 31 }), "x={x}");
    }
    assert!(!fb.pixel(Point { x: 3, y: 31 }));

    run(&mut m, &mut keys, 1);
    assert_eq!(m.frame_buffer(), &FrameBuffer::new());
}

#[test]
fn key_skips() {
    let mut m = machine(&[0x6105, 0xe19e, 0x7001, 0xe1a1, 0x7001]);
    let mut keys = Keypad::default();
    keys.down[5] = true;

    run(&mut m, &mut keys, 4);
    assert_eq!(v(&m, 0), 1);

    let mut m = machine(&[0x6105, 0xe19e, 0x7001, 0xe1a1, 0x7001]);
    run(&mut m, &mut Keypad::default(), 4);
    assert_eq!(v(&m, 0), 1);
    assert_eq!(m.registers().pc, 0x20a);
}

#[test]
fn wait_for_key_suspends_across_frames() {
    let mut m = machine(&[0xf30a, 0x6101]);
    let mut keys = Keypad::default();

    assert_eq!(m.step(&mut keys), Ok(StepStatus::WaitingForKey));
    assert!(m.is_waiting_for_key());
    assert_eq!(m.registers().pc, 0x202);

    for _ in 0..5 {
        assert_eq!(m.run_frame(10, &mut keys), Ok(StepStatus::WaitingForKey));
        assert_eq!(m.registers().pc, 0x202);
        assert_eq!(v(&m, 1), 0);
    }

    keys.press(0xb);
    assert_eq!(m.step(&mut keys), Ok(StepStatus::Executed));
    assert!(!m.is_waiting_for_key());
    assert_eq!(v(&m, 3), 0xb);
    assert_eq!(m.registers().pc, 0x202);

    run(&mut m, &mut keys, 1);
    assert_eq!(v(&m, 1), 1);
}

#[test]
fn wait_for_key_with_press_pending() {
    let mut m = machine(&[0xf20a]);
    let mut keys = Keypad::default();
    keys.press(4);

    run(&mut m, &mut keys, 1);
    assert_eq!(v(&m, 2), 4);
    assert!(!m.is_waiting_for_key());
}

#[test]
fn timers_tick_once_per_frame() {
    // V0 := 3; DT := V0; ST := V0; then spin.
    let mut m = machine(&[0x6003, 0xf015, 0xf018, 0x1206]);
    let mut keys = Keypad::default();

    assert_eq!(m.run_frame(3, &mut keys), Ok(StepStatus::Executed));
    assert_eq!(m.timers().delay, 2);
    assert!(m.timers().sound_active());

    m.run_frame(100, &mut keys).unwrap();
    m.run_frame(0, &mut keys).unwrap();
    assert_eq!(m.timers().delay, 0);
    assert!(!m.timers().sound_active());

    m.run_frame(1, &mut keys).unwrap();
    assert_eq!(m.timers().delay, 0);
}

#[test]
fn read_delay_timer() {
    let mut m = machine(&[0x6009, 0xf015, 0xf107]);
    let mut keys = Keypad::default();
    run(&mut m, &mut keys, 2);
    m.tick_timers();
    run(&mut m, &mut keys, 1);
    assert_eq!(v(&m, 1), 8);
}

#[test]
fn machines_are_independent() {
    let words = [0x2204, 0x0000, 0x00ee];
    let mut a = machine(&words);
    let mut b = machine(&words);
    let mut keys = Keypad::default();

    run(&mut a, &mut keys, 1);
    assert_eq!(a.stack_depth(), 1);
    assert_eq!(b.stack_depth(), 0);
    run(&mut b, &mut keys, 1);
    run(&mut b, &mut keys, 1);
    assert_eq!(b.registers().pc, 0x202);
    assert_eq!(a.registers().pc, 0x204);
}
