use std::{fmt::Debug, io};

use super::screen::FrameBuffer;

/// The keypad, as seen by the interpreter. Keycodes are `0x0..=0xf`.
///
/// Mapping physical keys onto keycodes is up to the implementor.
pub trait InputDevice: Debug {
    /// Is the given key currently held down?
    fn is_key_down(&self, key: u8) -> bool;

    /// Take a key press that arrived since the last call, if any.
    ///
    /// Used by `FX0A`.
    fn take_key_press(&mut self) -> Option<u8>;
}

/// Something that can show a frame.
pub trait Renderer {
    fn render(&mut self, frame: &FrameBuffer) -> io::Result<()>;
}
