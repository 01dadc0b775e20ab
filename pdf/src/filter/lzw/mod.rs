//! LZW coding as used by `/LZWDecode`: MSB first codes growing from 9 to 12
//! bits, 256 clears the table and 257 ends the data.

mod bits;
mod decode;
mod dict;
mod encode;

pub use decode::LZWDecode;
pub use encode::LZWEncode;

use crate::error::Result;
use crate::params::FilterParams;

pub const CLEAR_CODE: u16 = 256;
pub const EOD_CODE: u16 = 257;
pub const FIRST_CODE: u16 = 258;
pub const MAX_DICT_SIZE: u16 = 4096;
pub const MIN_BITS: u32 = 9;
pub const MAX_BITS: u32 = 12;

fn early_change(params: &FilterParams) -> Result<u16> {
    Ok(params.ranged_or("early_change", 1, 0, 1)? as u16)
}

/// Whether the code width must grow once the table holds `size` codes.
fn width_exceeded(size: u16, early_change: u16, width: u32) -> bool {
    size as u32 + early_change as u32 >= 1 << width
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::{LZWDecode, LZWEncode};
    use crate::filter::process;
    use crate::params::FilterParams;

    fn params(early_change: i64) -> FilterParams {
        FilterParams::default().with("early_change", early_change)
    }

    fn round_trip(data: &[u8], early_change: i64, size: usize) {
        let mut encoder = LZWEncode::new(&params(early_change)).unwrap();
        let encoded = process(&mut encoder, data, size).unwrap();
        let mut decoder = LZWDecode::new(&params(early_change)).unwrap();
        let decoded = process(&mut decoder, &encoded, size).unwrap();
        assert_eq!(decoded.len(), data.len());
        assert!(decoded == data, "round trip mismatch, early_change {}", early_change);
    }

    #[test]
    fn test_round_trip_small() {
        for ec in [0, 1] {
            round_trip(b"", ec, 4096);
            round_trip(b"x", ec, 4096);
            round_trip(b"TOBEORNOTTOBEORTOBEORNOT", ec, 4096);
            round_trip(b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", ec, 1);
        }
    }

    #[test]
    fn test_round_trip_random() {
        let mut rng = StdRng::seed_from_u64(0x1234);
        for ec in [0, 1] {
            let mut data = vec![0u8; 40000];
            rng.fill(&mut data[..]);
            round_trip(&data, ec, 4096);
            round_trip(&data[..5000], ec, 3);
        }
    }

    #[test]
    fn test_round_trip_long_run() {
        let data = vec![b'q'; 200_000];
        for ec in [0, 1] {
            round_trip(&data, ec, 4096);
        }
    }

    #[test]
    fn test_round_trip_low_entropy() {
        let mut rng = StdRng::seed_from_u64(99);
        let data: Vec<u8> = (0..100_000).map(|_| rng.gen_range(b'a'..=b'd')).collect();
        for ec in [0, 1] {
            round_trip(&data, ec, 512);
        }
    }
}
