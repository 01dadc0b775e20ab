use super::{MAX_BITS, MIN_BITS};
use crate::buffer::Buffer;

fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// Packs codes MSB first.
pub(crate) struct CodeWriter {
    acc: u64,
    nbits: u32,
    width: u32,
}

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter {
            acc: 0,
            nbits: 0,
            width: MIN_BITS,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    /// Returns false when the width is already at its maximum.
    pub fn inc_width(&mut self) -> bool {
        if self.width == MAX_BITS {
            return false;
        }
        self.width += 1;
        true
    }

    pub fn put(&mut self, code: u16) {
        self.acc = (self.acc << self.width) | (code as u64 & mask(self.width));
        self.nbits += self.width;
    }

    /// Zero fill up to the next byte boundary.
    pub fn pad(&mut self) {
        let rem = self.nbits % 8;
        if rem != 0 {
            self.acc <<= 8 - rem;
            self.nbits += 8 - rem;
        }
    }

    /// Write every complete byte, returns false if the output filled up first.
    pub fn drain(&mut self, output: &mut Buffer) -> bool {
        while self.nbits >= 8 {
            let b = (self.acc >> (self.nbits - 8)) as u8;
            if !output.put_byte(b) {
                return false;
            }
            self.nbits -= 8;
            self.acc &= mask(self.nbits);
        }
        true
    }
}

/// Unpacks codes MSB first, carrying partial codes across calls.
pub(crate) struct CodeReader {
    acc: u64,
    nbits: u32,
    width: u32,
}

impl CodeReader {
    pub fn new() -> Self {
        CodeReader {
            acc: 0,
            nbits: 0,
            width: MIN_BITS,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn inc_width(&mut self) -> bool {
        if self.width == MAX_BITS {
            return false;
        }
        self.width += 1;
        true
    }

    /// `None` once `input` is drained without a complete code.
    pub fn get(&mut self, input: &mut Buffer) -> Option<u16> {
        while self.nbits < self.width {
            let b = input.get_byte()?;
            self.acc = (self.acc << 8) | b as u64;
            self.nbits += 8;
        }
        let code = (self.acc >> (self.nbits - self.width)) & mask(self.width);
        self.nbits -= self.width;
        self.acc &= mask(self.nbits);
        Some(code as u16)
    }
}
