use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("stack overflow: more than {capacity} nested calls")]
    StackOverflow { capacity: usize },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("unknown opcode 0x{opcode:04x} (pc=0x{pc:04x})")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("ROM is {size} bytes, but only {max} bytes fit above 0x200")]
    RomTooLarge { size: usize, max: usize },

    #[error("access of {len} byte(s) at 0x{addr:04x} is outside memory")]
    OutOfRangeAddress { addr: usize, len: usize },
}

impl Error {
    /// Fatal errors stop the machine. An unknown opcode is skipped instead.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnknownOpcode { .. })
    }
}
