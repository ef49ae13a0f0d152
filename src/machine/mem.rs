use std::fmt::{self, Debug};

use super::debug::{self, DebugHexByte};
use super::error::{Error, Result};

/// 4 KiB of byte-addressable memory.
///
/// The built-in hex digit glyphs live at `0x000..0x050`; programs are loaded
/// at [`MemoryBank::ROM_START`].
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryBank {
    bytes: Box<[u8; Self::LEN]>,
}

impl MemoryBank {
    pub const LEN: usize = 4 * 1024;
    pub const ROM_START: u16 = 0x0200;
    pub const MAX_ROM_LEN: usize = Self::LEN - Self::ROM_START as usize;

    pub const GLYPH_LEN: u16 = 5;

    /// Empty memory with the font glyphs in place.
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: Box::new([0u8; Self::LEN]),
        };
        let font: Vec<_> = DIGITS.into_iter().flatten().collect();
        mem.bytes[..font.len()].copy_from_slice(&font);
        mem
    }

    /// Memory with `rom` copied verbatim to `0x200`.
    pub fn with_rom(rom: &[u8]) -> Result<Self> {
        if rom.len() > Self::MAX_ROM_LEN {
            return Err(Error::RomTooLarge {
                size: rom.len(),
                max: Self::MAX_ROM_LEN,
            });
        }

        let mut mem = Self::new();
        mem.load_bytes(Self::ROM_START, rom)?;
        Ok(mem)
    }

    /// Address of the glyph for hex digit `d`.
    pub fn glyph_addr(d: u8) -> u16 {
        d as u16 * Self::GLYPH_LEN
    }

    pub fn read(&self, addr: u16) -> Result<u8> {
        Self::check(addr, 1)?;
        Ok(self.bytes[addr as usize])
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<()> {
        Self::check(addr, 1)?;
        self.bytes[addr as usize] = value;
        Ok(())
    }

    /// Fetch the big-endian instruction word at `addr`.
    pub fn read_word(&self, addr: u16) -> Result<u16> {
        let bytes = self.slice(addr, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        Self::check(addr, len)?;
        Ok(&self.bytes[addr as usize..][..len])
    }

    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        Self::check(addr, len)?;
        Ok(&mut self.bytes[addr as usize..][..len])
    }

    pub fn load_bytes(&mut self, offset: u16, data: &[u8]) -> Result<()> {
        self.slice_mut(offset, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn check(addr: u16, len: usize) -> Result<()> {
        let addr = addr as usize;
        if addr + len > Self::LEN {
            return Err(Error::OutOfRangeAddress { addr, len });
        }
        Ok(())
    }
}

impl Default for MemoryBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Bitmaps for the built-in hex digit sprites.
const DIGITS: [[u8; 5]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0],
    [0x20, 0x60, 0x20, 0x20, 0x70],
    [0xF0, 0x10, 0xF0, 0x80, 0xF0],
    [0xF0, 0x10, 0xF0, 0x10, 0xF0],
    [0x90, 0x90, 0xF0, 0x10, 0x10],
    [0xF0, 0x80, 0xF0, 0x10, 0xF0],
    [0xF0, 0x80, 0xF0, 0x90, 0xF0],
    [0xF0, 0x10, 0x20, 0x40, 0x40],
    [0xF0, 0x90, 0xF0, 0x90, 0xF0],
    [0xF0, 0x90, 0xF0, 0x10, 0xF0],
    [0xF0, 0x90, 0xF0, 0x90, 0x90],
    [0xE0, 0x90, 0xE0, 0x90, 0xE0],
    [0xF0, 0x80, 0x80, 0x80, 0xF0],
    [0xE0, 0x90, 0x90, 0x90, 0xE0],
    [0xF0, 0x80, 0xF0, 0x80, 0xF0],
    [0xF0, 0x80, 0xF0, 0x80, 0x80],
];

impl Debug for MemoryBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return self.debug_compact(f);
        }

        // Like `hexdump`: rows of 16 bytes, runs of zero rows collapsed.
        writeln!(f)?;

        let mut prev_blank = false;
        for (i, line) in self.bytes.chunks(16).enumerate() {
            if line.iter().all(|&b| b == 0) {
                if !prev_blank {
                    writeln!(f, "...")?;
                }
                prev_blank = true;
                continue;
            }
            prev_blank = false;

            write!(f, "{i:02x}0: ")?;
            debug::write_row(f, line)?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl MemoryBank {
    /// Helper for <MemoryBank as Debug>::fmt
    fn debug_compact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Skip the suffix of all zeros.
        let end = self
            .bytes
            .iter()
            .rposition(|&x| x != 0)
            .map_or(0, |i| i + 1);
        let entries = self.bytes[..end].iter().copied().map(DebugHexByte);

        f.debug_list().entries(entries).finish()
    }
}
