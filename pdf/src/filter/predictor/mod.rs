//! PNG and TIFF predictors applied row by row.
//!
//! Only whole rows are accepted: a stream whose length is not a multiple of
//! the row length is rejected once the input is finished.

mod bit_cursor;
pub mod png;
mod tiff;

use crate::buffer::Buffer;
use crate::error::{PdfError, Result};
use crate::filter::{Filter, FilterStatus};
use crate::params::FilterParams;

use png::{PngFilter, ALL_FILTERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predictor {
    None,
    Tiff,
    Png(PngFilter),
    /// Encoder picks the cheapest PNG algorithm per row.
    PngOptimum,
}

impl Predictor {
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Predictor::None),
            2 => Ok(Predictor::Tiff),
            10 => Ok(Predictor::Png(PngFilter::None)),
            11 => Ok(Predictor::Png(PngFilter::Sub)),
            12 => Ok(Predictor::Png(PngFilter::Up)),
            13 => Ok(Predictor::Png(PngFilter::Average)),
            14 => Ok(Predictor::Png(PngFilter::Paeth)),
            15 => Ok(Predictor::PngOptimum),
            _ => Err(PdfError::InvalidParameter(format!(
                "Unsupported predictor {}",
                code
            ))),
        }
    }

    pub fn is_png(&self) -> bool {
        matches!(self, Predictor::Png(_) | Predictor::PngOptimum)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorParams {
    pub predictor: Predictor,
    pub colors: usize,
    pub bits_per_component: u32,
    pub columns: usize,
}

impl PredictorParams {
    pub fn try_new(params: &FilterParams) -> Result<Self> {
        let predictor = Predictor::from_code(params.integer_or("predictor", 1)?)?;
        let colors = params.ranged_or("colors", 1, 1, 32)? as usize;
        let bits_per_component = params.integer_or("bits_per_component", 8)?;
        if !matches!(bits_per_component, 1 | 2 | 4 | 8 | 16) {
            return Err(PdfError::InvalidParameter(format!(
                "bits_per_component must be 1, 2, 4, 8 or 16 got:{}",
                bits_per_component
            )));
        }
        let columns = params.ranged_or("columns", 1, 1, 1 << 24)? as usize;
        Ok(PredictorParams {
            predictor,
            colors,
            bits_per_component: bits_per_component as u32,
            columns,
        })
    }

    pub fn samples_per_row(&self) -> usize {
        self.columns * self.colors
    }

    pub fn scanline_len(&self) -> usize {
        (self.samples_per_row() * self.bits_per_component as usize).div_ceil(8)
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.colors * self.bits_per_component as usize).div_ceil(8)
    }

    /// Length of an encoded row including the PNG tag byte.
    pub fn encoded_row_len(&self) -> usize {
        if self.predictor.is_png() {
            self.scanline_len() + 1
        } else {
            self.scanline_len()
        }
    }
}

/// Row assembly shared by both directions: collect `in_len` bytes, transform
/// them into `out`, then hand `out` to the caller.
struct RowState {
    row: Vec<u8>,
    filled: usize,
    out: Vec<u8>,
    out_pos: usize,
    done: bool,
}

/// Zero filled row buffer, allocation failure is an error.
fn zeroed(len: usize) -> Result<Vec<u8>> {
    let mut row = Vec::new();
    row.try_reserve_exact(len)
        .map_err(|e| PdfError::OutOfMemory(format!("row of {} bytes: {:?}", len, e)))?;
    row.resize(len, 0);
    Ok(row)
}

impl RowState {
    fn new(in_len: usize, out_len: usize) -> Result<Self> {
        Ok(RowState {
            row: zeroed(in_len)?,
            filled: 0,
            out: zeroed(out_len)?,
            // nothing pending yet
            out_pos: out_len,
            done: false,
        })
    }

    /// Drives one apply call, `transform` turns a complete row into `out`.
    fn run<F>(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
        mut transform: F,
    ) -> Result<FilterStatus>
    where
        F: FnMut(&[u8], &mut [u8]) -> Result<()>,
    {
        loop {
            if self.out_pos < self.out.len() {
                self.out_pos += output.write_from(&self.out[self.out_pos..]);
                if self.out_pos < self.out.len() {
                    return Ok(FilterStatus::NeedsMoreOutput);
                }
            }
            if self.done {
                return Ok(FilterStatus::EndOfData);
            }
            if self.filled == self.row.len() {
                transform(&self.row, &mut self.out)?;
                self.out_pos = 0;
                self.filled = 0;
                continue;
            }
            if input.is_at_end() {
                if !finish {
                    return Ok(FilterStatus::NeedsMoreInput);
                }
                if self.filled != 0 {
                    return Err(PdfError::Filter(format!(
                        "Predictor input ends inside a row ({} of {} bytes)",
                        self.filled,
                        self.row.len()
                    )));
                }
                self.done = true;
                continue;
            }
            self.filled += input.read_into(&mut self.row[self.filled..]);
        }
    }
}

fn pass_through(input: &mut Buffer, output: &mut Buffer, finish: bool) -> FilterStatus {
    input.transfer_to(output);
    if !input.is_at_end() {
        FilterStatus::NeedsMoreOutput
    } else if finish {
        FilterStatus::EndOfData
    } else {
        FilterStatus::NeedsMoreInput
    }
}

pub struct PredictorEncode {
    params: PredictorParams,
    state: RowState,
    // previous raw row
    prev: Vec<u8>,
    scratch: Vec<u8>,
}

impl PredictorEncode {
    pub fn new(params: &FilterParams) -> Result<Self> {
        let params = PredictorParams::try_new(params)?;
        let scanline_len = params.scanline_len();
        Ok(PredictorEncode {
            state: RowState::new(scanline_len, params.encoded_row_len())?,
            prev: zeroed(scanline_len)?,
            scratch: zeroed(scanline_len)?,
            params,
        })
    }
}

impl Filter for PredictorEncode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        let params = &self.params;
        let prev = &mut self.prev;
        let scratch = &mut self.scratch;
        match params.predictor {
            Predictor::None => Ok(pass_through(input, output, finish)),
            Predictor::Tiff => self.state.run(input, output, finish, |row, out| {
                out.copy_from_slice(row);
                tiff::encode_row(
                    out,
                    params.colors,
                    params.bits_per_component,
                    params.samples_per_row(),
                )
            }),
            Predictor::Png(filter) => self.state.run(input, output, finish, |row, out| {
                out[0] = filter as u8;
                png::encode_row(filter, row, prev, params.bytes_per_pixel(), &mut out[1..]);
                prev.copy_from_slice(row);
                Ok(())
            }),
            Predictor::PngOptimum => self.state.run(input, output, finish, |row, out| {
                let bpp = params.bytes_per_pixel();
                let mut best: Option<(u64, PngFilter)> = None;
                for filter in ALL_FILTERS {
                    png::encode_row(filter, row, prev, bpp, scratch);
                    let cost = png::cost(scratch);
                    if best.map_or(true, |(c, _)| cost < c) {
                        best = Some((cost, filter));
                        out[1..].copy_from_slice(scratch);
                    }
                }
                out[0] = best.map_or(PngFilter::None, |(_, f)| f) as u8;
                prev.copy_from_slice(row);
                Ok(())
            }),
        }
    }
}

pub struct PredictorDecode {
    params: PredictorParams,
    state: RowState,
    // previous reconstructed row
    prev: Vec<u8>,
}

impl PredictorDecode {
    pub fn new(params: &FilterParams) -> Result<Self> {
        let params = PredictorParams::try_new(params)?;
        let scanline_len = params.scanline_len();
        Ok(PredictorDecode {
            state: RowState::new(params.encoded_row_len(), scanline_len)?,
            prev: zeroed(scanline_len)?,
            params,
        })
    }
}

impl Filter for PredictorDecode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        let params = &self.params;
        let prev = &mut self.prev;
        match params.predictor {
            Predictor::None => Ok(pass_through(input, output, finish)),
            Predictor::Tiff => self.state.run(input, output, finish, |row, out| {
                out.copy_from_slice(row);
                tiff::decode_row(
                    out,
                    params.colors,
                    params.bits_per_component,
                    params.samples_per_row(),
                )
            }),
            Predictor::Png(_) | Predictor::PngOptimum => {
                self.state.run(input, output, finish, |row, out| {
                    // every row carries its own algorithm tag
                    let filter = PngFilter::try_from(row[0])?;
                    out.copy_from_slice(&row[1..]);
                    png::decode_row(filter, out, prev, params.bytes_per_pixel());
                    prev.copy_from_slice(out);
                    Ok(())
                })
            }
        }
    }
}
