use log::debug;
use zune_jpeg::zune_core::colorspace::ColorSpace;
use zune_jpeg::zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

use crate::buffer::Buffer;
use crate::error::{PdfError, Result};
use crate::filter::{Filter, FilterStatus};
use crate::params::FilterParams;

pub use source::SourceManager;

pub mod source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegHeader {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub components: usize,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn row_len(&self) -> usize {
        self.width * self.components
    }
}

/// External JPEG codec, reached only through the [`SourceManager`].
pub trait JpegDecompressor {
    fn read_header(&mut self, src: &mut SourceManager) -> Result<JpegHeader>;

    fn decompress(&mut self, src: &mut SourceManager) -> Result<DecodedImage>;
}

/// [`JpegDecompressor`] backed by `zune-jpeg`.
///
/// Gray images decode to 1 component and colour images to RGB. Four
/// component images stay 4 components: CMYK is passed through and YCCK is
/// converted to CMYK.
#[derive(Default)]
pub struct ZuneDecompressor {
    data: Vec<u8>,
    input_colorspace: Option<ColorSpace>,
}

impl JpegDecompressor for ZuneDecompressor {
    fn read_header(&mut self, src: &mut SourceManager) -> Result<JpegHeader> {
        let data = src.fill().to_vec();
        src.skip(data.len());
        self.data = data;
        let mut decoder = JpegDecoder::new(self.data.as_slice());
        decoder
            .decode_headers()
            .map_err(|e| PdfError::Filter(format!("DctDecode header error:{:?}", e)))?;
        let (width, height) = decoder
            .dimensions()
            .ok_or_else(|| PdfError::Filter("DctDecode image has no dimensions".to_string()))?;
        self.input_colorspace = decoder.get_input_colorspace();
        Ok(JpegHeader { width, height })
    }

    fn decompress(&mut self, _src: &mut SourceManager) -> Result<DecodedImage> {
        let input_colorspace = self.input_colorspace.take();
        let mut options = DecoderOptions::default();
        if let Some(cs @ (ColorSpace::CMYK | ColorSpace::YCCK)) = input_colorspace {
            options = options.jpeg_set_out_colorspace(cs);
        }
        let mut decoder = JpegDecoder::new_with_options(self.data.as_slice(), options);
        let mut pixels = decoder
            .decode()
            .map_err(|e| PdfError::Filter(format!("DctDecode error:{:?}", e)))?;
        let (width, height) = decoder
            .dimensions()
            .ok_or_else(|| PdfError::Filter("DctDecode image has no dimensions".to_string()))?;
        self.data = Vec::new();
        let area = width * height;
        if area == 0 {
            return Err(PdfError::Filter("DctDecode image is empty".to_string()));
        }
        if input_colorspace == Some(ColorSpace::YCCK) {
            ycck_to_cmyk(&mut pixels);
        }
        Ok(DecodedImage {
            width,
            height,
            components: pixels.len() / area,
            pixels,
        })
    }
}

/// Convert YCCK samples to CMYK in place, CMY being the complement of the
/// RGB value of the YCbCr triple. K is unchanged.
fn ycck_to_cmyk(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let y = f32::from(px[0]);
        let cb = f32::from(px[1]) - 128.0;
        let cr = f32::from(px[2]) - 128.0;
        let r = y + 1.402 * cr;
        let g = y - 0.344_136 * cb - 0.714_136 * cr;
        let b = y + 1.772 * cb;
        px[0] = 255 - r.round().clamp(0.0, 255.0) as u8;
        px[1] = 255 - g.round().clamp(0.0, 255.0) as u8;
        px[2] = 255 - b.round().clamp(0.0, 255.0) as u8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DctState {
    Init,
    Cache,
    ReadHeader,
    StartDecompress,
    WriteHeader,
    Scanline,
    Done,
}

pub struct DCTDecode {
    state: DctState,
    source: SourceManager,
    decompressor: Box<dyn JpegDecompressor>,
    pnm_header: bool,
    header: Option<JpegHeader>,
    image: Option<DecodedImage>,
    pnm: Vec<u8>,
    // bytes of `pnm` then of the pixel data already written
    written: usize,
}

impl DCTDecode {
    pub fn new(params: &FilterParams) -> Result<Self> {
        Self::with_decompressor(params, Box::<ZuneDecompressor>::default())
    }

    pub fn with_decompressor(
        params: &FilterParams,
        decompressor: Box<dyn JpegDecompressor>,
    ) -> Result<Self> {
        Ok(DCTDecode {
            state: DctState::Init,
            source: SourceManager::new(),
            decompressor,
            pnm_header: params.bool_or("pnm_header", false)?,
            header: None,
            image: None,
            pnm: Vec::new(),
            written: 0,
        })
    }

    fn build_pnm_header(image: &DecodedImage) -> Result<Vec<u8>> {
        let magic = match image.components {
            1 => "P5",
            3 => "P6",
            n => {
                return Err(PdfError::Filter(format!(
                    "PNM output needs 1 or 3 components got:{}",
                    n
                )))
            }
        };
        Ok(format!("{}\n{} {}\n255\n", magic, image.width, image.height).into_bytes())
    }
}

impl Filter for DCTDecode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        loop {
            match self.state {
                DctState::Init => self.state = DctState::Cache,
                DctState::Cache => {
                    self.source.cache(input.unread());
                    input.consume(input.available());
                    if !finish {
                        return Ok(FilterStatus::NeedsMoreInput);
                    }
                    self.state = DctState::ReadHeader;
                }
                DctState::ReadHeader => {
                    let header = self.decompressor.read_header(&mut self.source)?;
                    debug!(
                        "DctDecode {}x{} from {} bytes",
                        header.width,
                        header.height,
                        self.source.cached_len()
                    );
                    self.header = Some(header);
                    self.state = DctState::StartDecompress;
                }
                DctState::StartDecompress => {
                    let image = self.decompressor.decompress(&mut self.source)?;
                    if image.pixels.len() != image.row_len() * image.height {
                        return Err(PdfError::Filter(format!(
                            "DctDecode produced {} bytes for {}x{}x{}",
                            image.pixels.len(),
                            image.width,
                            image.height,
                            image.components
                        )));
                    }
                    let resized = self
                        .header
                        .is_some_and(|h| h.width != image.width || h.height != image.height);
                    if resized {
                        return Err(PdfError::Filter(
                            "DctDecode image size differs from its header".to_string(),
                        ));
                    }
                    if self.pnm_header {
                        self.pnm = Self::build_pnm_header(&image)?;
                    }
                    self.image = Some(image);
                    self.written = 0;
                    self.state = DctState::WriteHeader;
                }
                DctState::WriteHeader => {
                    self.written += output.write_from(&self.pnm[self.written..]);
                    if self.written < self.pnm.len() {
                        return Ok(FilterStatus::NeedsMoreOutput);
                    }
                    self.written = 0;
                    self.state = DctState::Scanline;
                }
                DctState::Scanline => {
                    let Some(image) = self.image.as_ref() else {
                        return Err(PdfError::Filter("DctDecode lost its image".to_string()));
                    };
                    // one scanline at a time, the last one may be split over calls
                    while self.written < image.pixels.len() {
                        let row_end = (self.written / image.row_len() + 1) * image.row_len();
                        let n = output.write_from(&image.pixels[self.written..row_end]);
                        self.written += n;
                        if self.written < row_end {
                            return Ok(FilterStatus::NeedsMoreOutput);
                        }
                    }
                    self.source.term();
                    self.image = None;
                    self.state = DctState::Done;
                }
                DctState::Done => return Ok(FilterStatus::EndOfData),
            }
        }
    }
}
