use std::io;
use std::path::Path;

use log::{debug, warn};

use crate::backend::{Backend, FileBackend, MemBackend};
use crate::buffer::Buffer;
use crate::chain::{FilterChain, Upstream};
use crate::error::{PdfError, Result};
use crate::filter::{FilterMode, FilterStatus, FilterType};
use crate::params::FilterParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmMode {
    Read,
    Write,
}

/// Buffer sizes shared by a stream and its filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    pub cache_size: usize,
    pub filter_buffer_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            cache_size: 4096,
            filter_buffer_size: 4096,
        }
    }
}

/// Outcome of a read, write or flush carrying the number of bytes moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Complete(usize),
    /// The stream ended before the request could be satisfied.
    EndOfData(usize),
}

impl Transfer {
    pub fn bytes(&self) -> usize {
        match self {
            Transfer::Complete(n) | Transfer::EndOfData(n) => *n,
        }
    }

    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Transfer::EndOfData(_))
    }
}

/// Byte stream running data through a filter chain.
///
/// A read stream pulls bytes from the backend, through the chain, into the
/// cache callers read from. A write stream takes caller bytes into the tail
/// of the chain and flushes what comes out of the head to the backend.
pub struct Stream<B: Backend> {
    mode: StmMode,
    backend: Option<B>,
    cache: Buffer,
    chain: FilterChain,
    seq_counter: u64,
}

impl Stream<MemBackend> {
    /// In write mode `data.len()` bounds how much can be written.
    pub fn new_mem(data: Vec<u8>, mode: StmMode, options: StreamOptions) -> Result<Self> {
        let backend = match mode {
            StmMode::Read => MemBackend::new(data),
            StmMode::Write => MemBackend::with_capacity(data.len()),
        };
        Stream::new(backend, mode, options)
    }
}

impl Stream<FileBackend> {
    pub fn open_file<P: AsRef<Path>>(
        path: P,
        mode: StmMode,
        options: StreamOptions,
    ) -> Result<Self> {
        Stream::new(FileBackend::open(path, mode)?, mode, options)
    }
}

impl<B: Backend> Stream<B> {
    pub fn new(backend: B, mode: StmMode, options: StreamOptions) -> Result<Self> {
        if options.cache_size == 0 {
            return Err(PdfError::InvalidParameter(
                "cache size must be positive".to_string(),
            ));
        }
        Ok(Stream {
            mode,
            backend: Some(backend),
            cache: Buffer::new(options.cache_size)?,
            chain: FilterChain::new(options.filter_buffer_size)?,
            seq_counter: 0,
        })
    }

    pub fn mode(&self) -> StmMode {
        self.mode
    }

    /// Install a filter at the head of the chain, next to the cache. It runs
    /// after every filter installed before it.
    pub fn install_filter(
        &mut self,
        filter_type: FilterType,
        mode: FilterMode,
        params: &FilterParams,
    ) -> Result<()> {
        self.chain.install(filter_type, mode, params)
    }

    pub fn filter_types(&self) -> Vec<FilterType> {
        self.chain.filter_types()
    }

    fn check_mode(&self, mode: StmMode) -> Result<()> {
        if self.mode != mode {
            return Err(PdfError::InvalidOperation(format!(
                "{:?} stream used for {:?}",
                self.mode, mode
            )));
        }
        Ok(())
    }

    fn backend_mut(backend: &mut Option<B>) -> Result<&mut B> {
        backend
            .as_mut()
            .ok_or_else(|| PdfError::InvalidOperation("stream backend is closed".to_string()))
    }

    /// Make sure the cache holds unread bytes, false at end of data.
    fn fill_cache(&mut self) -> Result<bool> {
        while self.cache.is_at_end() {
            self.cache.rewind();
            let backend = Self::backend_mut(&mut self.backend)?;
            let status = self.chain.apply(&mut self.cache, Upstream::Backend(backend))?;
            if !self.cache.is_at_end() {
                break;
            }
            if matches!(status, FilterStatus::EndOfData | FilterStatus::NeedsMoreInput) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<Transfer> {
        self.check_mode(StmMode::Read)?;
        let mut n = 0;
        while n < buf.len() {
            if !self.fill_cache()? {
                break;
            }
            n += self.cache.read_into(&mut buf[n..]);
        }
        self.seq_counter += n as u64;
        if n < buf.len() {
            return Ok(Transfer::EndOfData(n));
        }
        Ok(Transfer::Complete(n))
    }

    pub fn peek_byte(&mut self) -> Result<Option<u8>> {
        self.check_mode(StmMode::Read)?;
        if !self.fill_cache()? {
            return Ok(None);
        }
        Ok(self.cache.peek_byte())
    }

    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut b = [0u8; 1];
        match self.read(&mut b)? {
            Transfer::Complete(_) => Ok(Some(b[0])),
            Transfer::EndOfData(_) => Ok(None),
        }
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<Transfer> {
        self.check_mode(StmMode::Write)?;
        if self.chain.is_finished() {
            return Ok(Transfer::EndOfData(0));
        }
        let mut n = 0;
        while n < buf.len() {
            let input = self.chain.tail_input()?;
            input.compact();
            n += input.write_from(&buf[n..]);
            if n < buf.len() && self.flush(false)?.is_end_of_data() {
                break;
            }
        }
        self.seq_counter += n as u64;
        if n < buf.len() {
            return Ok(Transfer::EndOfData(n));
        }
        Ok(Transfer::Complete(n))
    }

    /// Hand the cache to the backend, false if it took only part of it.
    fn write_cache(&mut self) -> Result<(usize, bool)> {
        if self.cache.is_at_end() {
            self.cache.rewind();
            return Ok((0, true));
        }
        let backend = Self::backend_mut(&mut self.backend)?;
        let written = backend.write(self.cache.unread())?;
        self.cache.consume(written);
        if !self.cache.is_at_end() {
            warn!(
                "backend accepted {} bytes, {} left in cache",
                written,
                self.cache.available()
            );
            self.cache.compact();
            return Ok((written, false));
        }
        self.cache.rewind();
        Ok((written, true))
    }

    /// Push pending data through the chain to the backend. With `finish`
    /// the filters emit their trailers and the stream is finalized, further
    /// calls return `EndOfData` without touching the output.
    pub fn flush(&mut self, finish: bool) -> Result<Transfer> {
        self.check_mode(StmMode::Write)?;
        let mut flushed = 0;
        loop {
            let (written, complete) = self.write_cache()?;
            flushed += written;
            if !complete || self.chain.is_finished() {
                return Ok(Transfer::EndOfData(flushed));
            }
            let status = self.chain.apply(&mut self.cache, Upstream::Caller { finish })?;
            if status == FilterStatus::NeedsMoreInput {
                let (written, complete) = self.write_cache()?;
                flushed += written;
                if !complete {
                    return Ok(Transfer::EndOfData(flushed));
                }
                return Ok(Transfer::Complete(flushed));
            }
            if status == FilterStatus::EndOfData {
                debug!("stream finalized");
            }
        }
    }

    /// Reposition the backend. Filters are rebuilt and buffered data is
    /// dropped, so the next read starts filtering afresh at `pos`.
    ///
    /// A write stream is finished first: the filters emit what they still
    /// hold and their trailers, and writes after the seek start a new
    /// filtered segment at `pos`. If the backend does not take all of it the
    /// seek fails and the stream keeps its position.
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        if self.mode == StmMode::Write {
            self.flush(true)?;
            if !self.cache.is_at_end() {
                return Err(PdfError::Backend(format!(
                    "seek with {} bytes the backend did not take",
                    self.cache.available()
                )));
            }
        }
        let backend = Self::backend_mut(&mut self.backend)?;
        let new_pos = backend.seek(pos)?;
        self.cache.rewind();
        self.chain.reset()?;
        self.seq_counter = 0;
        Ok(new_pos)
    }

    /// Backend position adjusted by the bytes waiting in the cache.
    pub fn tell(&mut self) -> Result<u64> {
        let cached = self.cache.available() as u64;
        let backend = Self::backend_mut(&mut self.backend)?;
        let pos = backend.tell()?;
        Ok(match self.mode {
            StmMode::Read => pos.saturating_sub(cached),
            StmMode::Write => pos + cached,
        })
    }

    /// Bytes read or written by the caller since creation or the last seek.
    pub fn sequential_position(&self) -> u64 {
        self.seq_counter
    }

    fn finalize(&mut self) -> Result<()> {
        if self.backend.is_none() {
            return Ok(());
        }
        if self.mode == StmMode::Write {
            let res = self.flush(true)?;
            if !self.cache.is_at_end() {
                warn!(
                    "stream closed with {} unwritten bytes after flushing {}",
                    self.cache.available(),
                    res.bytes()
                );
            }
        }
        Self::backend_mut(&mut self.backend)?.close()
    }

    /// Finalize the stream and hand back its backend.
    pub fn destroy(mut self) -> Result<B> {
        self.finalize()?;
        self.backend
            .take()
            .ok_or_else(|| PdfError::InvalidOperation("stream backend is closed".to_string()))
    }
}

impl<B: Backend> Drop for Stream<B> {
    fn drop(&mut self) {
        if let Err(e) = self.finalize() {
            warn!("drop stream error:{:?}", e);
        }
    }
}

fn into_io_error(e: PdfError) -> io::Error {
    match e {
        PdfError::Io(e) => e,
        e => io::Error::new(io::ErrorKind::Other, e),
    }
}

impl<B: Backend> io::Read for Stream<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Stream::read(self, buf)
            .map(|t| t.bytes())
            .map_err(into_io_error)
    }
}

impl<B: Backend> io::Write for Stream<B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Stream::write(self, buf)
            .map(|t| t.bytes())
            .map_err(into_io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        Stream::flush(self, false)
            .map(|_| ())
            .map_err(into_io_error)
    }
}
