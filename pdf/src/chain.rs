use log::{debug, warn};

use crate::backend::Backend;
use crate::buffer::Buffer;
use crate::error::{PdfError, Result};
use crate::filter::{new_filter, Filter, FilterMode, FilterStatus, FilterType};
use crate::params::FilterParams;

/// Where the tail of a chain takes its bytes from.
pub enum Upstream<'a> {
    /// Read mode, the tail pulls from the backend until it reports EOF.
    Backend(&'a mut dyn Backend),
    /// Write mode, the caller fills the tail input. `finish` marks that
    /// nothing more will be written.
    Caller { finish: bool },
}

struct Stage {
    filter: Box<dyn Filter>,
    input: Buffer,
    filter_type: FilterType,
    mode: FilterMode,
    params: FilterParams,
    // nothing will be added to `input` anymore
    input_eof: bool,
    done: bool,
}

impl Stage {
    fn new(
        filter_type: FilterType,
        mode: FilterMode,
        params: FilterParams,
        buffer_size: usize,
    ) -> Result<Self> {
        Ok(Stage {
            filter: new_filter(filter_type, mode, &params)?,
            input: Buffer::new(buffer_size)?,
            filter_type,
            mode,
            params,
            input_eof: false,
            done: false,
        })
    }

    fn reset(&mut self) -> Result<()> {
        self.filter = new_filter(self.filter_type, self.mode, &self.params)?;
        self.input.rewind();
        self.input_eof = false;
        self.done = false;
        Ok(())
    }
}

/// Ordered filters between a stream cache and its data source.
///
/// Index 0 is the head, it writes into the cache. Every other stage writes
/// into the input buffer of the stage before it and the last stage (the
/// tail) is fed by the [`Upstream`]. Data is pulled from the head: a stage
/// asking for input makes the next stage run.
pub struct FilterChain {
    stages: Vec<Stage>,
    buffer_size: usize,
}

impl FilterChain {
    /// Create a chain holding a single null filter.
    pub fn new(buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(PdfError::InvalidParameter(
                "filter buffer size must be positive".to_string(),
            ));
        }
        let null = Stage::new(
            FilterType::Null,
            FilterMode::Decode,
            FilterParams::default(),
            buffer_size,
        )?;
        Ok(FilterChain {
            stages: vec![null],
            buffer_size,
        })
    }

    /// Put a new filter at the head of the chain.
    pub fn install(
        &mut self,
        filter_type: FilterType,
        mode: FilterMode,
        params: &FilterParams,
    ) -> Result<()> {
        let stage = Stage::new(filter_type, mode, params.clone(), self.buffer_size)?;
        debug!(
            "install {:?} {:?} filter, chain length {}",
            filter_type,
            mode,
            self.stages.len() + 1
        );
        self.stages.insert(0, stage);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Filter types from head to tail.
    pub fn filter_types(&self) -> Vec<FilterType> {
        self.stages.iter().map(|s| s.filter_type).collect()
    }

    /// Input buffer of the tail, filled directly by writers.
    pub fn tail_input(&mut self) -> Result<&mut Buffer> {
        self.stages
            .last_mut()
            .map(|s| &mut s.input)
            .ok_or_else(|| PdfError::InvalidOperation("filter chain is empty".to_string()))
    }

    /// The head has emitted all of its data.
    pub fn is_finished(&self) -> bool {
        self.stages.first().map_or(true, |s| s.done)
    }

    /// Rebuild every filter from its stored parameters and drop buffered data.
    pub fn reset(&mut self) -> Result<()> {
        for stage in self.stages.iter_mut() {
            stage.reset()?;
        }
        debug!("reset chain of {} filters", self.stages.len());
        Ok(())
    }

    /// Run the chain until `output` is full, the upstream runs dry or the
    /// head reaches its end of data.
    pub fn apply(&mut self, output: &mut Buffer, mut upstream: Upstream) -> Result<FilterStatus> {
        pull(&mut self.stages, output, &mut upstream)
    }
}

fn pull(
    stages: &mut [Stage],
    output: &mut Buffer,
    upstream: &mut Upstream,
) -> Result<FilterStatus> {
    let Some((stage, rest)) = stages.split_first_mut() else {
        return Err(PdfError::InvalidOperation(
            "filter chain is empty".to_string(),
        ));
    };
    loop {
        if stage.done {
            return Ok(FilterStatus::EndOfData);
        }
        let status = stage
            .filter
            .apply(&mut stage.input, output, stage.input_eof)?;
        match status {
            FilterStatus::EndOfData => {
                stage.done = true;
                return Ok(FilterStatus::EndOfData);
            }
            FilterStatus::NeedsMoreOutput => return Ok(FilterStatus::NeedsMoreOutput),
            FilterStatus::Ok => {
                if output.is_full() {
                    return Ok(FilterStatus::NeedsMoreOutput);
                }
            }
            FilterStatus::NeedsMoreInput => {
                if stage.input_eof {
                    warn!(
                        "{:?} filter wants input after end of data",
                        stage.filter_type
                    );
                    stage.done = true;
                    return Ok(FilterStatus::EndOfData);
                }
                stage.input.compact();
                if !rest.is_empty() {
                    match pull(rest, &mut stage.input, upstream)? {
                        FilterStatus::EndOfData => stage.input_eof = true,
                        FilterStatus::NeedsMoreInput if stage.input.is_at_end() => {
                            return Ok(FilterStatus::NeedsMoreInput)
                        }
                        _ => {}
                    }
                    continue;
                }
                match upstream {
                    Upstream::Backend(backend) => {
                        let n = backend.read(stage.input.spare_mut())?;
                        stage.input.commit(n);
                        if n == 0 {
                            stage.input_eof = true;
                        }
                    }
                    Upstream::Caller { finish } => {
                        if !*finish {
                            return Ok(FilterStatus::NeedsMoreInput);
                        }
                        stage.input_eof = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterChain, Upstream};
    use crate::backend::MemBackend;
    use crate::buffer::Buffer;
    use crate::filter::{apply_filter, FilterMode, FilterStatus, FilterType};
    use crate::params::FilterParams;

    fn drain(chain: &mut FilterChain, backend: &mut MemBackend, size: usize) -> Vec<u8> {
        let mut out = Buffer::new(size).unwrap();
        let mut res = Vec::new();
        loop {
            let status = chain.apply(&mut out, Upstream::Backend(backend)).unwrap();
            res.extend_from_slice(out.unread());
            out.rewind();
            if status == FilterStatus::EndOfData {
                return res;
            }
        }
    }

    #[test]
    fn test_null_chain() {
        let mut chain = FilterChain::new(3).unwrap();
        assert_eq!(chain.filter_types(), [FilterType::Null]);
        let mut backend = MemBackend::new(b"0123456789".to_vec());
        assert_eq!(drain(&mut chain, &mut backend, 4), b"0123456789");
        assert!(chain.is_finished());
    }

    #[test]
    fn test_install_order() {
        let mut chain = FilterChain::new(2).unwrap();
        let params = FilterParams::default();
        chain
            .install(FilterType::ASCII85, FilterMode::Decode, &params)
            .unwrap();
        chain
            .install(FilterType::ASCIIHex, FilterMode::Decode, &params)
            .unwrap();
        assert_eq!(
            chain.filter_types(),
            [FilterType::ASCIIHex, FilterType::ASCII85, FilterType::Null]
        );
        let hex = apply_filter(FilterType::ASCIIHex, FilterMode::Encode, &params, b"p").unwrap();
        let encoded = apply_filter(FilterType::ASCII85, FilterMode::Encode, &params, &hex).unwrap();
        assert_eq!(encoded, b"2_[D~>");
        let mut backend = MemBackend::new(encoded);
        assert_eq!(drain(&mut chain, &mut backend, 1), b"p");
    }

    #[test]
    fn test_caller_upstream() {
        let mut chain = FilterChain::new(8).unwrap();
        chain
            .install(FilterType::ASCIIHex, FilterMode::Encode, &FilterParams::default())
            .unwrap();
        chain.tail_input().unwrap().write_from(b"ab");
        let mut out = Buffer::new(64).unwrap();
        let status = chain
            .apply(&mut out, Upstream::Caller { finish: false })
            .unwrap();
        assert_eq!(status, FilterStatus::NeedsMoreInput);
        chain.tail_input().unwrap().write_from(b"c");
        let status = chain
            .apply(&mut out, Upstream::Caller { finish: true })
            .unwrap();
        assert_eq!(status, FilterStatus::EndOfData);
        assert_eq!(out.unread(), b"616263>");
        let status = chain
            .apply(&mut out, Upstream::Caller { finish: true })
            .unwrap();
        assert_eq!(status, FilterStatus::EndOfData);
        assert_eq!(out.unread(), b"616263>");
    }

    #[test]
    fn test_reset() {
        let mut chain = FilterChain::new(16).unwrap();
        chain
            .install(FilterType::RunLength, FilterMode::Decode, &FilterParams::default())
            .unwrap();
        let mut backend = MemBackend::new(b"\xfeA\x80".to_vec());
        assert_eq!(drain(&mut chain, &mut backend, 16), b"AAA");
        chain.reset().unwrap();
        assert!(!chain.is_finished());
        let mut backend = MemBackend::new(b"\x01xy\x80".to_vec());
        assert_eq!(drain(&mut chain, &mut backend, 16), b"xy");
    }

    #[test]
    fn test_filter_error_propagates() {
        let mut chain = FilterChain::new(16).unwrap();
        chain
            .install(FilterType::ASCIIHex, FilterMode::Decode, &FilterParams::default())
            .unwrap();
        let mut backend = MemBackend::new(b"4g>".to_vec());
        let mut out = Buffer::new(16).unwrap();
        assert!(chain.apply(&mut out, Upstream::Backend(&mut backend)).is_err());
    }

    #[test]
    fn test_zero_buffer_size() {
        assert!(FilterChain::new(0).is_err());
    }
}
