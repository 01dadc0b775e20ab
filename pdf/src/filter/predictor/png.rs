use crate::error::{PdfError, Result};

/// Per row algorithm tag of the PNG predictors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngFilter {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

pub(crate) const ALL_FILTERS: [PngFilter; 5] = [
    PngFilter::None,
    PngFilter::Sub,
    PngFilter::Up,
    PngFilter::Average,
    PngFilter::Paeth,
];

impl TryFrom<u8> for PngFilter {
    type Error = PdfError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(PngFilter::None),
            1 => Ok(PngFilter::Sub),
            2 => Ok(PngFilter::Up),
            3 => Ok(PngFilter::Average),
            4 => Ok(PngFilter::Paeth),
            _ => Err(PdfError::Filter(format!("Unknown PNG predictor {}", tag))),
        }
    }
}

fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn predict(filter: PngFilter, left: u8, up: u8, up_left: u8) -> u8 {
    match filter {
        PngFilter::None => 0,
        PngFilter::Sub => left,
        PngFilter::Up => up,
        PngFilter::Average => ((left as u16 + up as u16) / 2) as u8,
        PngFilter::Paeth => paeth_predictor(left, up, up_left),
    }
}

/// `prev` is the previous raw row, all zeros for the first one.
pub(crate) fn encode_row(filter: PngFilter, row: &[u8], prev: &[u8], bpp: usize, out: &mut [u8]) {
    for i in 0..row.len() {
        let (left, up_left) = if i >= bpp {
            (row[i - bpp], prev[i - bpp])
        } else {
            (0, 0)
        };
        out[i] = row[i].wrapping_sub(predict(filter, left, prev[i], up_left));
    }
}

/// Reverse the prediction in place, `prev` is the previous reconstructed row.
pub(crate) fn decode_row(filter: PngFilter, row: &mut [u8], prev: &[u8], bpp: usize) {
    for i in 0..row.len() {
        let (left, up_left) = if i >= bpp {
            (row[i - bpp], prev[i - bpp])
        } else {
            (0, 0)
        };
        row[i] = row[i].wrapping_add(predict(filter, left, prev[i], up_left));
    }
}

/// Sum of the residuals read as signed bytes, the usual PNG heuristic.
pub(crate) fn cost(encoded: &[u8]) -> u64 {
    encoded
        .iter()
        .map(|b| (*b as i8).unsigned_abs() as u64)
        .sum()
}
