use std::{
    fmt::{self, Debug},
    ops::{Index, IndexMut},
};

use super::debug;
use super::mem::MemoryBank;

/// `V0..=VF`, the index register `I`, and the program counter.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    v: [u8; 16],
    pub i: u16,
    pub pc: u16,
}

impl RegisterFile {
    pub const FLAG: u8 = 0xf;

    pub fn new() -> Self {
        Self {
            v: [0; 16],
            i: 0,
            pc: MemoryBank::ROM_START,
        }
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v[Self::FLAG as usize] = set as u8;
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for RegisterFile {
    type Output = u8;

    fn index(&self, index: u8) -> &Self::Output {
        &self.v[index as usize]
    }
}

impl IndexMut<u8> for RegisterFile {
    fn index_mut(&mut self, index: u8) -> &mut Self::Output {
        &mut self.v[index as usize]
    }
}

impl Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pc={:03x} i={:03x} v=[ ", self.pc, self.i)?;
        debug::write_row(f, &self.v)?;
        write!(f, " ]")
    }
}
