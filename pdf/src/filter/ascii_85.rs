use log::warn;

use crate::buffer::Buffer;
use crate::character::{is_white_space, GREATER_THAN_SIGN, LINE_FEED, TILDE};
use crate::error::{PdfError, Result};
use crate::filter::{Filter, FilterStatus};

/// A line break is inserted once a line holds this many characters.
pub const LINE_LENGTH: usize = 65;

const POW85: [u32; 5] = [85 * 85 * 85 * 85, 85 * 85 * 85, 85 * 85, 85, 1];

/// Small FIFO of bytes that did not fit into the caller's output buffer.
struct Spill<const N: usize> {
    data: [u8; N],
    start: usize,
    end: usize,
}

impl<const N: usize> Default for Spill<N> {
    fn default() -> Self {
        Spill {
            data: [0; N],
            start: 0,
            end: 0,
        }
    }
}

impl<const N: usize> Spill<N> {
    fn push(&mut self, b: u8) {
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
        self.data[self.end] = b;
        self.end += 1;
    }

    /// Returns true once everything has been written.
    fn drain(&mut self, output: &mut Buffer) -> bool {
        while self.start < self.end {
            if !output.put_byte(self.data[self.start]) {
                return false;
            }
            self.start += 1;
        }
        true
    }
}

#[derive(Default)]
pub struct ASCII85Encode {
    group: [u8; 4],
    group_len: usize,
    line_length: usize,
    spill: Spill<8>,
    terminated: bool,
}

impl ASCII85Encode {
    fn push_char(&mut self, c: u8) {
        if self.line_length >= LINE_LENGTH {
            self.spill.push(LINE_FEED);
            self.line_length = 0;
        }
        self.spill.push(c);
        self.line_length += 1;
    }

    /// Encode the current group, `n` is the count of real bytes in it.
    fn encode_group(&mut self, n: usize) {
        for b in self.group[n..].iter_mut() {
            *b = 0;
        }
        let value = u32::from_be_bytes(self.group);
        if n == 4 && value == 0 {
            self.push_char(b'z');
        } else {
            let mut rest = value;
            for pow in POW85.iter().take(n + 1) {
                let digit = rest / pow;
                rest -= digit * pow;
                self.push_char(b'!' + digit as u8);
            }
        }
        self.group_len = 0;
    }

    fn push_terminator(&mut self) {
        if self.line_length + 2 > LINE_LENGTH {
            self.spill.push(LINE_FEED);
            self.line_length = 0;
        }
        self.spill.push(TILDE);
        self.spill.push(GREATER_THAN_SIGN);
        self.line_length += 2;
        self.terminated = true;
    }
}

impl Filter for ASCII85Encode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        loop {
            if !self.spill.drain(output) {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            if self.terminated {
                return Ok(FilterStatus::EndOfData);
            }
            if let Some(b) = input.get_byte() {
                self.group[self.group_len] = b;
                self.group_len += 1;
                if self.group_len == 4 {
                    self.encode_group(4);
                }
                continue;
            }
            if !finish {
                return Ok(FilterStatus::NeedsMoreInput);
            }
            if self.group_len > 0 {
                self.encode_group(self.group_len);
            }
            self.push_terminator();
        }
    }
}

#[derive(Default)]
pub struct ASCII85Decode {
    digits: [u8; 5],
    count: usize,
    // `~` consumed, `>` must follow
    tilde: bool,
    spill: Spill<4>,
    terminated: bool,
}

impl ASCII85Decode {
    fn group_value(&self) -> Result<u32> {
        self.digits.iter().try_fold(0u32, |acc, &d| {
            acc.checked_mul(85)
                .and_then(|v| v.checked_add(d as u32))
                .ok_or_else(|| {
                    PdfError::Filter(format!(
                        "ASCII85 group {:?} overflows 32 bits",
                        self.digits
                    ))
                })
        })
    }

    fn decode_group(&mut self) -> Result<()> {
        let value = self.group_value()?;
        for b in value.to_be_bytes() {
            self.spill.push(b);
        }
        self.count = 0;
        Ok(())
    }

    /// Decode the 2..=4 digits left before the terminator.
    fn decode_partial(&mut self) -> Result<()> {
        match self.count {
            0 => Ok(()),
            1 => Err(PdfError::Filter(
                "ASCII85 final group holds a single character".to_string(),
            )),
            n => {
                for d in self.digits[n..].iter_mut() {
                    *d = 84;
                }
                let value = self.group_value()?;
                for b in value.to_be_bytes().iter().take(n - 1) {
                    self.spill.push(*b);
                }
                self.count = 0;
                Ok(())
            }
        }
    }

    fn terminate(&mut self) -> Result<()> {
        self.decode_partial()?;
        self.terminated = true;
        Ok(())
    }
}

impl Filter for ASCII85Decode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        loop {
            if !self.spill.drain(output) {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            if self.terminated {
                return Ok(FilterStatus::EndOfData);
            }
            let Some(c) = input.get_byte() else {
                if !finish {
                    return Ok(FilterStatus::NeedsMoreInput);
                }
                if self.tilde {
                    return Err(PdfError::Filter(
                        "Truncated end sequence in ASCII85 stream".to_string(),
                    ));
                }
                warn!("ASCII85 stream ends without `~>`");
                self.terminate()?;
                continue;
            };
            if is_white_space(&c) {
                continue;
            }
            if self.tilde {
                if c != GREATER_THAN_SIGN {
                    return Err(PdfError::Filter(
                        "Invalid end sequence in ASCII85 stream".to_string(),
                    ));
                }
                self.terminate()?;
                continue;
            }
            match c {
                TILDE => self.tilde = true,
                b'z' => {
                    if self.count != 0 {
                        return Err(PdfError::Filter(
                            "`z` cannot appear inside a group".to_string(),
                        ));
                    }
                    for _ in 0..4 {
                        self.spill.push(0);
                    }
                }
                b'!'..=b'u' => {
                    self.digits[self.count] = c - b'!';
                    self.count += 1;
                    if self.count == 5 {
                        self.decode_group()?;
                    }
                }
                _ => {
                    return Err(PdfError::Filter(format!(
                        "Invalid character in ASCII85 stream: '{}'",
                        c
                    )))
                }
            }
        }
    }
}
