//! TIFF predictor 2, horizontal differencing of same channel samples.

use super::bit_cursor::BitCursor;
use crate::error::{PdfError, Result};

fn out_of_row() -> PdfError {
    PdfError::Filter("TIFF predictor sample outside the row".to_string())
}

pub(crate) fn encode_row(row: &mut [u8], colors: usize, bpc: u32, samples: usize) -> Result<()> {
    match bpc {
        8 => {
            for i in (colors..samples).rev() {
                row[i] = row[i].wrapping_sub(row[i - colors]);
            }
            Ok(())
        }
        16 => {
            for i in (colors..samples).rev() {
                let cur = u16::from_be_bytes([row[2 * i], row[2 * i + 1]]);
                let left = u16::from_be_bytes([row[2 * (i - colors)], row[2 * (i - colors) + 1]]);
                row[2 * i..2 * i + 2].copy_from_slice(&cur.wrapping_sub(left).to_be_bytes());
            }
            Ok(())
        }
        _ => {
            let modulus_mask = ((1u16 << bpc) - 1) as u8;
            // original values of the last `colors` samples
            let mut previous = vec![0u8; colors];
            let mut cursor = BitCursor::new(bpc);
            for i in 0..samples {
                let value = cursor.get(row).ok_or_else(out_of_row)?;
                if i >= colors {
                    let diff = value.wrapping_sub(previous[i % colors]) & modulus_mask;
                    cursor.set(row, diff).ok_or_else(out_of_row)?;
                }
                previous[i % colors] = value;
                cursor.advance();
            }
            Ok(())
        }
    }
}

pub(crate) fn decode_row(row: &mut [u8], colors: usize, bpc: u32, samples: usize) -> Result<()> {
    match bpc {
        8 => {
            for i in colors..samples {
                row[i] = row[i].wrapping_add(row[i - colors]);
            }
            Ok(())
        }
        16 => {
            for i in colors..samples {
                let cur = u16::from_be_bytes([row[2 * i], row[2 * i + 1]]);
                let left = u16::from_be_bytes([row[2 * (i - colors)], row[2 * (i - colors) + 1]]);
                row[2 * i..2 * i + 2].copy_from_slice(&cur.wrapping_add(left).to_be_bytes());
            }
            Ok(())
        }
        _ => {
            let modulus_mask = ((1u16 << bpc) - 1) as u8;
            let mut left = BitCursor::new(bpc);
            let mut cursor = BitCursor::at(colors, bpc);
            for _ in colors..samples {
                let value = cursor.get(row).ok_or_else(out_of_row)?;
                let base = left.get(row).ok_or_else(out_of_row)?;
                cursor
                    .set(row, value.wrapping_add(base) & modulus_mask)
                    .ok_or_else(out_of_row)?;
                cursor.advance();
                left.advance();
            }
            Ok(())
        }
    }
}
