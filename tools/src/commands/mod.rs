use clap::Parser;
use log::info;

use pdf_stm::{Backend, FilterMode, FilterParams, FilterType, PdfError, Result, Stream};

pub mod decode;
pub mod encode;

#[derive(Debug, Parser)]
pub struct FilterArgs {
    /// Filter names such as `A85`, `AHx`, `LZW`, `Fl`, `RL`, `DCT` or `Predictor`.
    #[arg(short, long = "filter", value_delimiter = ',')]
    pub filters: Vec<String>,

    #[arg(long, default_value_t = 1)]
    pub predictor: i64,

    #[arg(long, default_value_t = 1)]
    pub colors: i64,

    #[arg(long, default_value_t = 8)]
    pub bits_per_component: i64,

    #[arg(long, default_value_t = 1)]
    pub columns: i64,

    #[arg(long, default_value_t = 1)]
    pub early_change: i64,

    /// Prefix DCT output with a PNM header.
    #[arg(long)]
    pub pnm_header: bool,
}

impl FilterArgs {
    pub fn params(&self) -> FilterParams {
        FilterParams::default()
            .with("predictor", self.predictor)
            .with("colors", self.colors)
            .with("bits_per_component", self.bits_per_component)
            .with("columns", self.columns)
            .with("early_change", self.early_change)
            .with("pnm_header", self.pnm_header)
    }

    pub fn filter_types(&self) -> Result<Vec<FilterType>> {
        self.filters
            .iter()
            .map(|name| match name.trim_start_matches('/') {
                "Predictor" => Ok(FilterType::Predictor),
                other => FilterType::from_pdf_name(other),
            })
            .collect()
    }
}

/// Install the filters so the first one listed sits next to the backend.
pub fn install_filters<B: Backend>(
    stream: &mut Stream<B>,
    args: &FilterArgs,
    mode: FilterMode,
) -> Result<()> {
    let mut types = args.filter_types()?;
    if types.is_empty() {
        return Err(PdfError::InvalidParameter(
            "at least one filter is needed".to_string(),
        ));
    }
    // encoders run in reverse order
    if mode == FilterMode::Encode {
        types.reverse();
    }
    let params = args.params();
    for filter_type in types {
        info!("install {:?} {:?}", filter_type, mode);
        stream.install_filter(filter_type, mode, &params)?;
    }
    Ok(())
}
