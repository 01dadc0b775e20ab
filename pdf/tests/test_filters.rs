use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pdf_stm::filter::lzw::{LZWDecode, LZWEncode};
use pdf_stm::filter::{apply_filter, process, FilterMode, FilterType};
use pdf_stm::FilterParams;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

fn round_trip(filter_type: FilterType, params: &FilterParams, data: &[u8]) -> Vec<u8> {
    let encoded = apply_filter(filter_type, FilterMode::Encode, params, data).unwrap();
    apply_filter(filter_type, FilterMode::Decode, params, &encoded).unwrap()
}

#[test]
fn test_lzw_round_trip() {
    init();
    let inputs = vec![
        Vec::new(),
        vec![b'x'],
        vec![b'a'; 100_000],
        random_bytes(50_000, 1),
        b"TOBEORNOTTOBEORTOBEORNOT#".repeat(300),
    ];
    for early_change in [0, 1] {
        let params = FilterParams::default().with("early_change", early_change);
        for data in inputs.iter() {
            assert_eq!(&round_trip(FilterType::LZW, &params, data), data);
        }
    }
}

#[test]
fn test_lzw_small_buffers() {
    init();
    let data = random_bytes(5_000, 2);
    let params = FilterParams::default();
    let mut encoder = LZWEncode::new(&params).unwrap();
    let encoded = process(&mut encoder, &data, 4096).unwrap();
    let mut encoder = LZWEncode::new(&params).unwrap();
    assert_eq!(process(&mut encoder, &data, 1).unwrap(), encoded);

    let mut decoder = LZWDecode::new(&params).unwrap();
    assert_eq!(process(&mut decoder, &encoded, 1).unwrap(), data);
}

#[test]
fn test_ascii85_round_trip() {
    init();
    let params = FilterParams::default();
    for len in [0, 1, 2, 3, 4, 5, 63, 64, 1000] {
        let data = random_bytes(len, len as u64);
        assert_eq!(round_trip(FilterType::ASCII85, &params, &data), data);
    }
    let encoded =
        apply_filter(FilterType::ASCII85, FilterMode::Encode, &params, &[0, 0, 0, 0, 1]).unwrap();
    assert_eq!(&encoded[..1], b"z");
    assert_eq!(encoded.len(), 1 + 2 + 2);
}

#[test]
fn test_ascii_hex_encode() {
    let res = apply_filter(
        FilterType::ASCIIHex,
        FilterMode::Encode,
        &FilterParams::default(),
        b"abc",
    )
    .unwrap();
    assert_eq!(res, b"616263>");
}

#[test]
fn test_run_length_fixture() {
    let res = apply_filter(
        FilterType::RunLength,
        FilterMode::Decode,
        &FilterParams::default(),
        b"\x001\xff2\xfe3\xfd4\xfc5\xfb6\xfa7\xf98\xf89\x80",
    )
    .unwrap();
    assert_eq!(res, b"122333444455555666666777777788888888999999999");
}

#[test]
fn test_predictor_round_trip() {
    init();
    for predictor in [1, 2, 10, 11, 12, 13, 14, 15] {
        for (colors, bpc, columns) in [(1, 8, 7), (3, 8, 5), (2, 16, 3), (1, 1, 13), (3, 4, 9)] {
            let params = FilterParams::default()
                .with("predictor", predictor)
                .with("colors", colors)
                .with("bits_per_component", bpc)
                .with("columns", columns);
            let row_len = (colors * bpc * columns + 7) / 8;
            let data = random_bytes((row_len * 6) as usize, predictor as u64);
            assert_eq!(round_trip(FilterType::Predictor, &params, &data), data);
        }
    }
}

#[test]
fn test_flate_round_trip() {
    let data = random_bytes(10_000, 3);
    let params = FilterParams::default().with("level", 9);
    assert_eq!(round_trip(FilterType::Flate, &params, &data), data);
}
