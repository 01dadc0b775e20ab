use crate::buffer::Buffer;
use crate::character::{hex_digit, hex_value, is_white_space, GREATER_THAN_SIGN};
use crate::error::{PdfError, Result};
use crate::filter::{Filter, FilterStatus};

#[derive(Default)]
pub struct ASCIIHexEncode {
    // low digit of a byte whose high digit already went out
    pending: Option<u8>,
    terminated: bool,
}

impl Filter for ASCIIHexEncode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        if self.terminated {
            return Ok(FilterStatus::EndOfData);
        }
        loop {
            if let Some(digit) = self.pending {
                if !output.put_byte(digit) {
                    return Ok(FilterStatus::NeedsMoreOutput);
                }
                self.pending = None;
            }
            let Some(b) = input.peek_byte() else {
                break;
            };
            if !output.put_byte(hex_digit(b >> 4)) {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            input.consume(1);
            self.pending = Some(hex_digit(b));
        }
        if !finish {
            return Ok(FilterStatus::NeedsMoreInput);
        }
        if !output.put_byte(GREATER_THAN_SIGN) {
            return Ok(FilterStatus::NeedsMoreOutput);
        }
        self.terminated = true;
        Ok(FilterStatus::EndOfData)
    }
}

#[derive(Default)]
pub struct ASCIIHexDecode {
    high: Option<u8>,
    // `>` seen, only the padded odd digit may still be pending
    closing: bool,
    terminated: bool,
}

impl Filter for ASCIIHexDecode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        if self.terminated {
            return Ok(FilterStatus::EndOfData);
        }
        if self.closing {
            return self.terminate(output);
        }
        while let Some(c) = input.peek_byte() {
            if is_white_space(&c) {
                input.consume(1);
                continue;
            }
            if c == GREATER_THAN_SIGN {
                input.consume(1);
                return self.terminate(output);
            }
            let n = hex_value(&c).ok_or_else(|| {
                PdfError::Filter(format!(
                    "Invalid character in ASCIIHexDecode stream: '{}'",
                    c
                ))
            })?;
            match self.high {
                None => self.high = Some(n),
                Some(high) => {
                    if !output.put_byte((high << 4) | n) {
                        return Ok(FilterStatus::NeedsMoreOutput);
                    }
                    self.high = None;
                }
            }
            input.consume(1);
        }
        if finish {
            return self.terminate(output);
        }
        Ok(FilterStatus::NeedsMoreInput)
    }
}

impl ASCIIHexDecode {
    fn terminate(&mut self, output: &mut Buffer) -> Result<FilterStatus> {
        self.closing = true;
        if let Some(high) = self.high {
            if !output.put_byte(high << 4) {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            self.high = None;
        }
        self.terminated = true;
        Ok(FilterStatus::EndOfData)
    }
}
