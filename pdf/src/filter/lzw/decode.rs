use log::warn;

use super::bits::CodeReader;
use super::dict::Dictionary;
use super::{early_change, width_exceeded, CLEAR_CODE, EOD_CODE, MAX_DICT_SIZE, MIN_BITS};
use crate::buffer::Buffer;
use crate::error::{PdfError, Result};
use crate::filter::{Filter, FilterStatus};
use crate::params::FilterParams;

const SCRATCH_SIZE: usize = MAX_DICT_SIZE as usize;

pub struct LZWDecode {
    dict: Dictionary,
    reader: CodeReader,
    early_change: u16,
    prev: Option<u16>,
    // expanded string, pending bytes are scratch[start..]
    scratch: Vec<u8>,
    start: usize,
    done: bool,
}

impl LZWDecode {
    pub fn new(params: &FilterParams) -> Result<Self> {
        Ok(LZWDecode {
            dict: Dictionary::new(),
            reader: CodeReader::new(),
            early_change: early_change(params)?,
            prev: None,
            scratch: vec![0; SCRATCH_SIZE],
            start: SCRATCH_SIZE,
            done: false,
        })
    }

    fn expand(&mut self, code: u16, end: usize) -> Result<usize> {
        self.dict
            .expand(code, &mut self.scratch[..end])
            .ok_or_else(|| PdfError::Filter(format!("LZW string of code {} too long", code)))
    }

    fn decode_code(&mut self, code: u16) -> Result<()> {
        let size = self.dict.size();
        let Some(prev) = self.prev else {
            if code >= size {
                return Err(PdfError::Filter(format!(
                    "Invalid LZW code {} at the start of a table",
                    code
                )));
            }
            self.start = self.expand(code, SCRATCH_SIZE)?;
            self.prev = Some(code);
            return Ok(());
        };
        let first = if code < size {
            self.start = self.expand(code, SCRATCH_SIZE)?;
            self.scratch[self.start]
        } else if code == size {
            // the code being defined right now: prev's string plus its own first byte
            self.start = self.expand(prev, SCRATCH_SIZE - 1)?;
            let first = self.scratch[self.start];
            self.scratch[SCRATCH_SIZE - 1] = first;
            first
        } else {
            return Err(PdfError::Filter(format!(
                "Invalid LZW code {} with table size {}",
                code, size
            )));
        };
        self.dict.push(prev, first);
        if width_exceeded(self.dict.size(), self.early_change, self.reader.width()) {
            self.reader.inc_width();
        }
        self.prev = Some(code);
        Ok(())
    }
}

impl Filter for LZWDecode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        loop {
            if self.start < SCRATCH_SIZE {
                self.start += output.write_from(&self.scratch[self.start..]);
                if self.start < SCRATCH_SIZE {
                    return Ok(FilterStatus::NeedsMoreOutput);
                }
            }
            if self.done {
                return Ok(FilterStatus::EndOfData);
            }
            let Some(code) = self.reader.get(input) else {
                if !finish {
                    return Ok(FilterStatus::NeedsMoreInput);
                }
                warn!("LZW stream ends without an EOD code");
                self.done = true;
                continue;
            };
            match code {
                CLEAR_CODE => {
                    self.dict.reset();
                    self.reader.set_width(MIN_BITS);
                    self.prev = None;
                }
                EOD_CODE => self.done = true,
                _ => self.decode_code(code)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bitstream_io::{BigEndian, BitWrite, BitWriter};

    use super::LZWDecode;
    use crate::filter::process;
    use crate::params::FilterParams;

    fn decode(data: &[u8], size: usize) -> crate::error::Result<Vec<u8>> {
        let mut decoder = LZWDecode::new(&FilterParams::default()).unwrap();
        process(&mut decoder, data, size)
    }

    fn pack(codes: &[u16]) -> Vec<u8> {
        let mut writer = BitWriter::endian(Vec::new(), BigEndian);
        for code in codes {
            writer.write(9, *code).unwrap();
        }
        writer.byte_align().unwrap();
        writer.into_writer()
    }

    #[test]
    fn test_lzw_decode() {
        let encoded = [0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01];
        let res = decode(&encoded, 4096).unwrap();
        assert_eq!(res, [45, 45, 45, 45, 45, 65, 45, 45, 45, 66]);
        assert_eq!(decode(&encoded, 1).unwrap(), res);
    }

    #[test]
    fn test_code_defined_by_itself() {
        // "aaa": 97 then 258, which is being defined as "a" + "a"
        let encoded = pack(&[256, 97, 258, 257]);
        assert_eq!(decode(&encoded, 4096).unwrap(), b"aaa");
    }

    #[test]
    fn test_out_of_range_code() {
        let encoded = pack(&[256, 65, 300, 257]);
        assert!(decode(&encoded, 4096).is_err());
        let encoded = pack(&[256, 260, 257]);
        assert!(decode(&encoded, 4096).is_err());
    }

    #[test]
    fn test_clear_resets_table() {
        let encoded = pack(&[256, 65, 66, 258, 256, 67, 259, 257]);
        // after the clear 259 is undefined again and must not reuse "BA"
        assert!(decode(&encoded, 4096).is_err());
        let encoded = pack(&[256, 65, 66, 258, 256, 67, 68, 258, 257]);
        assert_eq!(decode(&encoded, 4096).unwrap(), b"ABABCDCD");
    }

    #[test]
    fn test_missing_eod() {
        let encoded = pack(&[256, 72, 105]);
        assert_eq!(decode(&encoded, 4096).unwrap(), b"Hi");
    }

    #[test]
    fn test_early_change_parameter() {
        let params = FilterParams::default().with("early_change", 2);
        assert!(LZWDecode::new(&params).is_err());
    }
}
