use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use log::warn;

use crate::buffer::Buffer;
use crate::error::{PdfError, Result};
use crate::filter::{Filter, FilterStatus};
use crate::params::FilterParams;

pub struct FlateEncode {
    inner: Compress,
    terminated: bool,
}

impl FlateEncode {
    pub fn new(params: &FilterParams) -> Result<Self> {
        let level = params.ranged_or("level", 6, 0, 9)?;
        Ok(FlateEncode {
            inner: Compress::new(Compression::new(level as u32), true),
            terminated: false,
        })
    }
}

impl Filter for FlateEncode {
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
            if output.is_full() {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            if input.is_at_end() && !finish {
                return Ok(FilterStatus::NeedsMoreInput);
            }
            let flush = if finish {
                FlushCompress::Finish
            } else {
                FlushCompress::None
            };
            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .compress(input.unread(), output.spare_mut(), flush)
                .map_err(|e| PdfError::Filter(format!("FlateEncode error:{:?}", e)))?;
            let consumed = (self.inner.total_in() - before_in) as usize;
            let produced = (self.inner.total_out() - before_out) as usize;
            input.consume(consumed);
            output.commit(produced);
            if status == Status::StreamEnd {
                self.terminated = true;
                return Ok(FilterStatus::EndOfData);
            }
            if consumed == 0 && produced == 0 && !output.is_full() {
                return Err(PdfError::Filter(
                    "FlateEncode made no progress".to_string(),
                ));
            }
        }
    }
}

pub struct FlateDecode {
    inner: Decompress,
    terminated: bool,
}

impl Default for FlateDecode {
    fn default() -> Self {
        FlateDecode {
            inner: Decompress::new(true),
            terminated: false,
        }
    }
}

impl Filter for FlateDecode {
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
            if output.is_full() {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            // FlushDecompress::Finish wants the whole output in one call, so
            // the end of input is detected from the lack of progress instead
            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .decompress(input.unread(), output.spare_mut(), FlushDecompress::None)
                .map_err(|e| PdfError::Filter(format!("FlateDecode error :{:?}", e)))?;
            let consumed = (self.inner.total_in() - before_in) as usize;
            let produced = (self.inner.total_out() - before_out) as usize;
            input.consume(consumed);
            output.commit(produced);
            if status == Status::StreamEnd {
                self.terminated = true;
                return Ok(FilterStatus::EndOfData);
            }
            if consumed == 0 && produced == 0 {
                if output.is_full() {
                    return Ok(FilterStatus::NeedsMoreOutput);
                }
                if !input.is_at_end() {
                    return Err(PdfError::Filter(
                        "FlateDecode made no progress".to_string(),
                    ));
                }
                if finish {
                    warn!("FlateDecode stream ends before the zlib trailer");
                    self.terminated = true;
                    return Ok(FilterStatus::EndOfData);
                }
                return Ok(FilterStatus::NeedsMoreInput);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FlateDecode, FlateEncode};
    use crate::filter::process;
    use crate::params::FilterParams;

    #[test]
    fn test_flated_decode() {
        let encoded = [
            0x78, 0x9c, 0x4b, 0xcb, 0xcf, 0x07, 0x00, 0x02, 0x82, 0x01, 0x45,
        ];
        let mut decoder = FlateDecode::default();
        assert_eq!(process(&mut decoder, &encoded, 4096).unwrap(), b"foo");
        let mut decoder = FlateDecode::default();
        assert_eq!(process(&mut decoder, &encoded, 1).unwrap(), b"foo");
    }

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..20000u32).map(|i| (i * 7 % 251) as u8).collect();
        let mut encoder = FlateEncode::new(&FilterParams::default()).unwrap();
        let encoded = process(&mut encoder, &data, 64).unwrap();
        assert!(encoded.len() < data.len());
        let mut decoder = FlateDecode::default();
        assert_eq!(process(&mut decoder, &encoded, 7).unwrap(), data);
    }

    #[test]
    fn test_invalid_level() {
        let params = FilterParams::default().with("level", 12);
        assert!(FlateEncode::new(&params).is_err());
    }

    #[test]
    fn test_corrupt_stream() {
        let mut decoder = FlateDecode::default();
        assert!(process(&mut decoder, b"\x78\x9cnot deflate at all", 4096).is_err());
    }
}
