use log::warn;

use crate::buffer::Buffer;
use crate::error::{PdfError, Result};
use crate::params::FilterParams;

use ascii_85::{ASCII85Decode, ASCII85Encode};
use ascii_hex::{ASCIIHexDecode, ASCIIHexEncode};
use dct::DCTDecode;
use flate::{FlateDecode, FlateEncode};
use lzw::{LZWDecode, LZWEncode};
use null::NullFilter;
use predictor::{PredictorDecode, PredictorEncode};
use run_length::{RunLengthDecode, RunLengthEncode};

pub mod ascii_85;
pub mod ascii_hex;
pub mod dct;
pub mod flate;
pub mod lzw;
pub mod null;
pub mod predictor;
pub mod run_length;

/// Flow control result of a single [`Filter::apply`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    Ok,
    /// Input exhausted before a full unit could be processed.
    NeedsMoreInput,
    /// Output buffer is full.
    NeedsMoreOutput,
    /// All trailing data has been emitted.
    EndOfData,
}

/// Incremental byte transform.
///
/// `apply` consumes from `input` and produces into `output` without
/// exceeding its capacity. `finish` tells the filter that nothing will follow
/// the bytes currently in `input`; once those are consumed the filter emits
/// its trailer and returns [`FilterStatus::EndOfData`]. Returning
/// `NeedsMoreInput` implies every byte of `input` has been consumed.
pub trait Filter {
    fn apply(&mut self, input: &mut Buffer, output: &mut Buffer, finish: bool)
        -> Result<FilterStatus>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    Null,
    ASCIIHex,
    ASCII85,
    RunLength,
    Flate,
    LZW,
    Predictor,
    DCT,
}

impl FilterType {
    pub fn from_pdf_name(name: &str) -> Result<Self> {
        match name {
            "ASCIIHexDecode" | "AHx" => Ok(FilterType::ASCIIHex),
            "ASCII85Decode" | "A85" => Ok(FilterType::ASCII85),
            "LZWDecode" | "LZW" => Ok(FilterType::LZW),
            "FlateDecode" | "Fl" => Ok(FilterType::Flate),
            "RunLengthDecode" | "RL" => Ok(FilterType::RunLength),
            "DCTDecode" | "DCT" => Ok(FilterType::DCT),
            _ => Err(PdfError::InvalidParameter(format!(
                "Filter {:?} not supported",
                name
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Encode,
    Decode,
}

impl FilterMode {
    /// Reads the `mode` key, `"encode"` or `"decode"`.
    pub fn from_params(params: &FilterParams) -> Result<Option<Self>> {
        match params.name("mode")? {
            None => Ok(None),
            Some("encode") => Ok(Some(FilterMode::Encode)),
            Some("decode") => Ok(Some(FilterMode::Decode)),
            Some(other) => Err(PdfError::InvalidParameter(format!(
                "mode must be encode or decode got:{}",
                other
            ))),
        }
    }
}

pub fn new_filter(
    filter_type: FilterType,
    mode: FilterMode,
    params: &FilterParams,
) -> Result<Box<dyn Filter>> {
    let filter: Box<dyn Filter> = match (filter_type, mode) {
        (FilterType::Null, _) => Box::<NullFilter>::default(),
        (FilterType::ASCIIHex, FilterMode::Encode) => Box::<ASCIIHexEncode>::default(),
        (FilterType::ASCIIHex, FilterMode::Decode) => Box::<ASCIIHexDecode>::default(),
        (FilterType::ASCII85, FilterMode::Encode) => Box::<ASCII85Encode>::default(),
        (FilterType::ASCII85, FilterMode::Decode) => Box::<ASCII85Decode>::default(),
        (FilterType::RunLength, FilterMode::Encode) => Box::<RunLengthEncode>::default(),
        (FilterType::RunLength, FilterMode::Decode) => Box::<RunLengthDecode>::default(),
        (FilterType::Flate, FilterMode::Encode) => Box::new(FlateEncode::new(params)?),
        (FilterType::Flate, FilterMode::Decode) => Box::<FlateDecode>::default(),
        (FilterType::LZW, FilterMode::Encode) => Box::new(LZWEncode::new(params)?),
        (FilterType::LZW, FilterMode::Decode) => Box::new(LZWDecode::new(params)?),
        (FilterType::Predictor, FilterMode::Encode) => Box::new(PredictorEncode::new(params)?),
        (FilterType::Predictor, FilterMode::Decode) => Box::new(PredictorDecode::new(params)?),
        (FilterType::DCT, FilterMode::Decode) => Box::new(DCTDecode::new(params)?),
        (FilterType::DCT, FilterMode::Encode) => {
            return Err(PdfError::InvalidParameter(
                "DCT encoding is not supported".to_string(),
            ))
        }
    };
    Ok(filter)
}

/// Run `data` through `filter` using input and output windows of
/// `buffer_size` bytes, collecting everything it produces.
pub fn process(filter: &mut dyn Filter, data: &[u8], buffer_size: usize) -> Result<Vec<u8>> {
    if buffer_size == 0 {
        return Err(PdfError::InvalidParameter(
            "buffer size must be positive".to_string(),
        ));
    }
    let mut input = Buffer::new(buffer_size)?;
    let mut output = Buffer::new(buffer_size)?;
    let mut result = Vec::new();
    let mut pos = 0;
    loop {
        input.compact();
        pos += input.write_from(&data[pos..]);
        let finish = pos == data.len();
        let status = filter.apply(&mut input, &mut output, finish)?;
        result.extend_from_slice(output.unread());
        output.rewind();
        match status {
            FilterStatus::EndOfData => break,
            FilterStatus::NeedsMoreInput if finish && input.is_at_end() => {
                warn!("filter asked for input after the last byte was supplied");
                break;
            }
            _ => {}
        }
    }
    Ok(result)
}

/// Shorthand for creating a filter and running a whole byte slice through it.
pub fn apply_filter(
    filter_type: FilterType,
    mode: FilterMode,
    params: &FilterParams,
    data: &[u8],
) -> Result<Vec<u8>> {
    let mut filter = new_filter(filter_type, mode, params)?;
    process(filter.as_mut(), data, 4096)
}
