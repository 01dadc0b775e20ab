/// Position of one sub-byte sample inside a row, MSB first.
///
/// Widths 1, 2 and 4 divide a byte, so a sample never straddles two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BitCursor {
    byte: usize,
    bit: u32,
    width: u32,
}

impl BitCursor {
    pub fn new(width: u32) -> Self {
        debug_assert!(matches!(width, 1 | 2 | 4));
        BitCursor {
            byte: 0,
            bit: 0,
            width,
        }
    }

    pub fn at(sample: usize, width: u32) -> Self {
        let bits = sample * width as usize;
        BitCursor {
            byte: bits / 8,
            bit: (bits % 8) as u32,
            width,
        }
    }

    fn mask(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    fn shift(&self) -> u32 {
        8 - self.bit - self.width
    }

    pub fn get(&self, data: &[u8]) -> Option<u8> {
        data.get(self.byte)
            .map(|b| (b >> self.shift()) & self.mask())
    }

    pub fn set(&self, data: &mut [u8], value: u8) -> Option<()> {
        let mask = self.mask() << self.shift();
        let shift = self.shift();
        let b = data.get_mut(self.byte)?;
        *b = (*b & !mask) | ((value << shift) & mask);
        Some(())
    }

    pub fn advance(&mut self) {
        self.bit += self.width;
        if self.bit >= 8 {
            self.byte += 1;
            self.bit -= 8;
        }
    }
}
