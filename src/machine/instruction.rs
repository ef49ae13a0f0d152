use std::fmt::{self, Display};

use super::error::{Error, Result};

/// A register index, `0x0..=0xf`.
pub type Reg = u8;

/// A decoded instruction, with its operand fields already extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`
    ClearScreen,
    /// `00EE`
    Return,
    /// `1NNN`
    Jump(u16),
    /// `2NNN`
    Call(u16),
    /// `3XNN`
    SkipEqImm(Reg, u8),
    /// `4XNN`
    SkipNeImm(Reg, u8),
    /// `5XY0`
    SkipEq(Reg, Reg),
    /// `6XNN`
    LoadImm(Reg, u8),
    /// `7XNN`
    AddImm(Reg, u8),
    /// `8XY0`
    Move(Reg, Reg),
    /// `8XY1`
    Or(Reg, Reg),
    /// `8XY2`
    And(Reg, Reg),
    /// `8XY3`
    Xor(Reg, Reg),
    /// `8XY4`
    Add(Reg, Reg),
    /// `8XY5`
    Sub(Reg, Reg),
    /// `8XY6`
    ShiftRight(Reg, Reg),
    /// `8XY7`
    SubReversed(Reg, Reg),
    /// `8XYE`
    ShiftLeft(Reg, Reg),
    /// `9XY0`
    SkipNe(Reg, Reg),
    /// `ANNN`
    LoadIndex(u16),
    /// `BNNN`
    JumpOffset(u16),
    /// `CXNN`
    Random(Reg, u8),
    /// `DXYN`
    Draw(Reg, Reg, u8),
    /// `EX9E`
    SkipKeyDown(Reg),
    /// `EXA1`
    SkipKeyUp(Reg),
    /// `FX07`
    ReadDelay(Reg),
    /// `FX0A`
    WaitKey(Reg),
    /// `FX15`
    WriteDelay(Reg),
    /// `FX18`
    WriteSound(Reg),
    /// `FX1E`
    AddIndex(Reg),
    /// `FX29`
    Glyph(Reg),
    /// `FX33`
    Bcd(Reg),
    /// `FX55`
    StoreRegs(Reg),
    /// `FX65`
    LoadRegs(Reg),
}

impl Instruction {
    /// Decode one instruction word. `pc` is only used for error reporting.
    pub fn decode(opcode: u16, pc: u16) -> Result<Self> {
        use Instruction::*;

        let [op, x, y, n] = nibbles_from_u16(opcode);
        let nn = (opcode & 0x00ff) as u8;
        let nnn = opcode & 0x0fff;

        let instr = match (op, n) {
            (0x0, _) => match opcode {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => return Err(Error::UnknownOpcode { opcode, pc }),
            },
            (0x1, _) => Jump(nnn),
            (0x2, _) => Call(nnn),
            (0x3, _) => SkipEqImm(x, nn),
            (0x4, _) => SkipNeImm(x, nn),
            (0x5, 0x0) => SkipEq(x, y),
            (0x6, _) => LoadImm(x, nn),
            (0x7, _) => AddImm(x, nn),
            (0x8, 0x0) => Move(x, y),
            (0x8, 0x1) => Or(x, y),
            (0x8, 0x2) => And(x, y),
            (0x8, 0x3) => Xor(x, y),
            (0x8, 0x4) => Add(x, y),
            (0x8, 0x5) => Sub(x, y),
            (0x8, 0x6) => ShiftRight(x, y),
            (0x8, 0x7) => SubReversed(x, y),
            (0x8, 0xe) => ShiftLeft(x, y),
            (0x9, 0x0) => SkipNe(x, y),
            (0xa, _) => LoadIndex(nnn),
            (0xb, _) => JumpOffset(nnn),
            (0xc, _) => Random(x, nn),
            (0xd, _) => Draw(x, y, n),
            (0xe, _) => match nn {
                0x9e => SkipKeyDown(x),
                0xa1 => SkipKeyUp(x),
                _ => return Err(Error::UnknownOpcode { opcode, pc }),
            },
            (0xf, _) => match nn {
                0x07 => ReadDelay(x),
                0x0a => WaitKey(x),
                0x15 => WriteDelay(x),
                0x18 => WriteSound(x),
                0x1e => AddIndex(x),
                0x29 => Glyph(x),
                0x33 => Bcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return Err(Error::UnknownOpcode { opcode, pc }),
            },
            _ => return Err(Error::UnknownOpcode { opcode, pc }),
        };

        Ok(instr)
    }
}

/// Big endian byte (and bit) order.
fn nibbles_from_u16(x: u16) -> [u8; 4] {
    let a = (x & 0xf000) >> 12;
    let b = (x & 0x0f00) >> 8;
    let c = (x & 0x00f0) >> 4;
    let d = x & 0x000f;
    [a, b, c, d].map(|n| n as u8)
}

/// Assembly-style mnemonics, for tracing.
impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP 0x{a:03x}"),
            Call(a) => write!(f, "CALL 0x{a:03x}"),
            SkipEqImm(x, nn) => write!(f, "SE V{x:X}, 0x{nn:02x}"),
            SkipNeImm(x, nn) => write!(f, "SNE V{x:X}, 0x{nn:02x}"),
            SkipEq(x, y) => write!(f, "SE V{x:X}, V{y:X}"),
            LoadImm(x, nn) => write!(f, "LD V{x:X}, 0x{nn:02x}"),
            AddImm(x, nn) => write!(f, "ADD V{x:X}, 0x{nn:02x}"),
            Move(x, y) => write!(f, "LD V{x:X}, V{y:X}"),
            Or(x, y) => write!(f, "OR V{x:X}, V{y:X}"),
            And(x, y) => write!(f, "AND V{x:X}, V{y:X}"),
            Xor(x, y) => write!(f, "XOR V{x:X}, V{y:X}"),
            Add(x, y) => write!(f, "ADD V{x:X}, V{y:X}"),
            Sub(x, y) => write!(f, "SUB V{x:X}, V{y:X}"),
            ShiftRight(x, y) => write!(f, "SHR V{x:X}, V{y:X}"),
            SubReversed(x, y) => write!(f, "SUBN V{x:X}, V{y:X}"),
            ShiftLeft(x, y) => write!(f, "SHL V{x:X}, V{y:X}"),
            SkipNe(x, y) => write!(f, "SNE V{x:X}, V{y:X}"),
            LoadIndex(a) => write!(f, "LD I, 0x{a:03x}"),
            JumpOffset(a) => write!(f, "JP V0, 0x{a:03x}"),
            Random(x, nn) => write!(f, "RND V{x:X}, 0x{nn:02x}"),
            Draw(x, y, n) => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            SkipKeyDown(x) => write!(f, "SKP V{x:X}"),
            SkipKeyUp(x) => write!(f, "SKNP V{x:X}"),
            ReadDelay(x) => write!(f, "LD V{x:X}, DT"),
            WaitKey(x) => write!(f, "LD V{x:X}, K"),
            WriteDelay(x) => write!(f, "LD DT, V{x:X}"),
            WriteSound(x) => write!(f, "LD ST, V{x:X}"),
            AddIndex(x) => write!(f, "ADD I, V{x:X}"),
            Glyph(x) => write!(f, "LD F, V{x:X}"),
            Bcd(x) => write!(f, "LD B, V{x:X}"),
            StoreRegs(x) => write!(f, "LD [I], V{x:X}"),
            LoadRegs(x) => write!(f, "LD V{x:X}, [I]"),
        }
    }
}
