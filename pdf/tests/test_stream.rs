use std::io::{Read, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pdf_stm::filter::apply_filter;
use pdf_stm::{
    FilterMode, FilterParams, FilterType, PdfError, StmMode, Stream, StreamOptions, Transfer,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn options(cache_size: usize, filter_buffer_size: usize) -> StreamOptions {
    StreamOptions {
        cache_size,
        filter_buffer_size,
    }
}

/// Encode `data` with `filters` given in PDF `/Filter` order.
fn encode(
    data: &[u8],
    filters: &[FilterType],
    params: &FilterParams,
    opts: StreamOptions,
) -> Vec<u8> {
    let mut stm = Stream::new_mem(vec![0; data.len() * 4 + 64], StmMode::Write, opts).unwrap();
    for filter_type in filters.iter().rev() {
        stm.install_filter(*filter_type, FilterMode::Encode, params)
            .unwrap();
    }
    assert_eq!(stm.write(data).unwrap(), Transfer::Complete(data.len()));
    assert!(stm.flush(true).unwrap().is_end_of_data());
    stm.destroy().unwrap().into_inner()
}

fn decode(
    data: &[u8],
    filters: &[FilterType],
    params: &FilterParams,
    opts: StreamOptions,
) -> Vec<u8> {
    let mut stm = Stream::new_mem(data.to_vec(), StmMode::Read, opts).unwrap();
    for filter_type in filters.iter() {
        stm.install_filter(*filter_type, FilterMode::Decode, params)
            .unwrap();
    }
    let mut res = Vec::new();
    stm.read_to_end(&mut res).unwrap();
    res
}

#[test]
fn test_mem_read_past_end() {
    init();
    let mut stm =
        Stream::new_mem(b"0123456789".to_vec(), StmMode::Read, StreamOptions::default()).unwrap();
    let mut buf = [0u8; 11];
    let res = stm.read(&mut buf).unwrap();
    assert_eq!(res, Transfer::EndOfData(10));
    assert_eq!(&buf[..10], b"0123456789");
}

#[test]
fn test_run_length_read_stream() {
    init();
    let fixture = b"\x001\xff2\xfe3\xfd4\xfc5\xfb6\xfa7\xf98\xf89\x80";
    let res = decode(
        fixture,
        &[FilterType::RunLength],
        &FilterParams::default(),
        StreamOptions::default(),
    );
    assert_eq!(res, b"122333444455555666666777777788888888999999999");
}

#[test]
fn test_ascii_hex_write_stream() {
    init();
    let res = encode(
        b"abc",
        &[FilterType::ASCIIHex],
        &FilterParams::default(),
        StreamOptions::default(),
    );
    assert_eq!(res, b"616263>");
}

#[test]
fn test_finish_is_idempotent() {
    init();
    let mut stm =
        Stream::new_mem(vec![0; 1024], StmMode::Write, StreamOptions::default()).unwrap();
    stm.install_filter(FilterType::LZW, FilterMode::Encode, &FilterParams::default())
        .unwrap();
    stm.write(b"-----A---B").unwrap();
    let first = stm.flush(true).unwrap();
    assert_eq!(first, Transfer::EndOfData(9));
    assert_eq!(stm.flush(true).unwrap(), Transfer::EndOfData(0));
    assert_eq!(stm.flush(false).unwrap(), Transfer::EndOfData(0));
    let out = stm.destroy().unwrap().into_inner();
    assert_eq!(out, [0x80, 0x0b, 0x60, 0x50, 0x22, 0x0c, 0x0c, 0x85, 0x01]);
}

#[test]
fn test_chained_round_trip() {
    init();
    let mut rng = StdRng::seed_from_u64(42);
    let mut data: Vec<u8> = (0..20_000).map(|_| rng.gen_range(b'a'..=b'f')).collect();
    data.extend(std::iter::repeat(0u8).take(3_000));
    let filters = [FilterType::ASCII85, FilterType::LZW];
    let params = FilterParams::default();

    let encoded = encode(&data, &filters, &params, StreamOptions::default());
    assert!(encoded.ends_with(b"~>"));
    assert!(encoded.iter().all(|b| b.is_ascii()));
    assert_eq!(decode(&encoded, &filters, &params, StreamOptions::default()), data);
}

#[test]
fn test_tiny_buffers() {
    init();
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<u8> = (0..3_000).map(|_| rng.gen_range(0..8u8)).collect();
    let filters = [FilterType::ASCIIHex, FilterType::Flate, FilterType::RunLength];
    let params = FilterParams::default();

    let reference = encode(&data, &filters, &params, StreamOptions::default());
    for opts in [options(1, 1), options(1, 7), options(5, 1), options(64, 3)] {
        let encoded = encode(&data, &filters, &params, opts);
        assert_eq!(decode(&encoded, &filters, &params, StreamOptions::default()), data);
        assert_eq!(decode(&reference, &filters, &params, opts), data);
    }
}

#[test]
fn test_flate_predictor_chain() {
    init();
    let params = FilterParams::default()
        .with("predictor", 12)
        .with("colors", 3)
        .with("columns", 10);
    let data: Vec<u8> = (0..30 * 8).map(|i| (i % 30) as u8).collect();
    let filters = [FilterType::Flate, FilterType::Predictor];
    let encoded = encode(&data, &filters, &params, options(16, 16));
    assert_eq!(decode(&encoded, &filters, &params, options(3, 5)), data);
}

#[test]
fn test_partial_row_fails_on_finish() {
    init();
    let params = FilterParams::default().with("predictor", 10).with("columns", 4);
    let mut stm =
        Stream::new_mem(vec![0; 64], StmMode::Write, StreamOptions::default()).unwrap();
    stm.install_filter(FilterType::Predictor, FilterMode::Encode, &params)
        .unwrap();
    stm.write(b"abcdef").unwrap();
    assert!(matches!(stm.flush(true), Err(PdfError::Filter(_))));
}

#[test]
fn test_write_seek_keeps_pending_data() {
    init();
    let params = FilterParams::default();
    let abcde = apply_filter(FilterType::ASCII85, FilterMode::Encode, &params, b"ABCDE").unwrap();
    let xyz = apply_filter(FilterType::ASCII85, FilterMode::Encode, &params, b"XYZ").unwrap();

    let mut stm =
        Stream::new_mem(vec![0; 64], StmMode::Write, StreamOptions::default()).unwrap();
    stm.install_filter(FilterType::ASCII85, FilterMode::Encode, &params)
        .unwrap();
    assert_eq!(stm.write(b"ABCDE").unwrap(), Transfer::Complete(5));
    // seeking back rewrites the same segment in place
    assert_eq!(stm.seek(0).unwrap(), 0);
    assert_eq!(stm.write(b"ABCDE").unwrap(), Transfer::Complete(5));
    // seeking to the end appends a second segment
    let end = abcde.len() as u64;
    assert_eq!(stm.seek(end).unwrap(), end);
    assert_eq!(stm.tell().unwrap(), end);
    assert_eq!(stm.sequential_position(), 0);
    assert_eq!(stm.write(b"XYZ").unwrap(), Transfer::Complete(3));

    let out = stm.destroy().unwrap().into_inner();
    assert_eq!(out, [abcde, xyz].concat());
}

#[test]
fn test_file_backend() {
    init();
    let path = std::env::temp_dir().join(format!("pdf_stm_test_{}.a85", std::process::id()));
    let data = b"Man is distinguished, not only by his reason".repeat(20);

    let mut stm = Stream::open_file(&path, StmMode::Write, options(16, 16)).unwrap();
    stm.install_filter(FilterType::ASCII85, FilterMode::Encode, &FilterParams::default())
        .unwrap();
    stm.write_all(&data).unwrap();
    stm.destroy().unwrap();

    let encoded = std::fs::read(&path).unwrap();
    assert!(encoded.ends_with(b"~>"));
    assert!(encoded.contains(&b'\n'));

    let mut stm = Stream::open_file(&path, StmMode::Read, options(16, 16)).unwrap();
    stm.install_filter(FilterType::ASCII85, FilterMode::Decode, &FilterParams::default())
        .unwrap();
    let mut res = Vec::new();
    stm.read_to_end(&mut res).unwrap();
    assert_eq!(res, data);
    assert_eq!(stm.sequential_position(), data.len() as u64);
    drop(stm);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_drop_finalizes_write() {
    init();
    let path = std::env::temp_dir().join(format!("pdf_stm_drop_{}.hex", std::process::id()));
    {
        let mut stm =
            Stream::open_file(&path, StmMode::Write, StreamOptions::default()).unwrap();
        stm.install_filter(FilterType::ASCIIHex, FilterMode::Encode, &FilterParams::default())
            .unwrap();
        stm.write(b"\x01\xff").unwrap();
    }
    assert_eq!(std::fs::read(&path).unwrap(), b"01FF>");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file() {
    let res = Stream::open_file(
        "/nonexistent/pdf_stm/input.bin",
        StmMode::Read,
        StreamOptions::default(),
    );
    assert!(matches!(res, Err(PdfError::Backend(_))));
}
