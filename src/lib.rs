//! A CHIP-8 interpreter core.
//!
//! The [`Machine`] owns all emulated state. A host drives it one frame at a
//! time: call [`Machine::step`] some number of times (or [`Machine::run_frame`]),
//! tick the timers once, then draw [`Machine::frame_buffer`].

pub mod machine;

pub use machine::{
    error::Error,
    instruction::Instruction,
    io::{InputDevice, Renderer},
    screen::{FrameBuffer, Point},
    Machine, StepStatus,
};
