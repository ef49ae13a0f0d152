use chip8_vm::FrameBuffer;
use std::fmt::{self, Display};

/// Helper for drawing a frame to a raw-mode terminal.
///
/// Each pixel is two columns wide, so the picture keeps roughly the right
/// aspect ratio. Lines end in `\r\n`, since raw mode doesn't translate `\n`.
pub struct DisplayFrame<'a>(pub &'a FrameBuffer);

impl<'a> Display for DisplayFrame<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.rows() {
            for &lit in row {
                let s = if lit { "██" } else { "  " };
                write!(f, "{s}")?;
            }
            write!(f, "\r\n")?;
        }
        Ok(())
    }
}
