use super::error::{Error, Result};

/// Return addresses for `2NNN`/`00EE`, at most 16 deep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    values: Vec<u16>,
}

impl CallStack {
    pub const CAPACITY: usize = 16;

    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(Self::CAPACITY),
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.values.len() >= Self::CAPACITY {
            return Err(Error::StackOverflow {
                capacity: Self::CAPACITY,
            });
        }
        self.values.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        self.values.pop().ok_or(Error::StackUnderflow)
    }

    pub fn depth(&self) -> usize {
        self.values.len()
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
