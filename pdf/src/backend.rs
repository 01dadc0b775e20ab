use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::error::{PdfError, Result};
use crate::stream::StmMode;

/// Byte source or sink at the far end of a [`Stream`](crate::stream::Stream).
///
/// `read` returning 0 means end of data. `write` may accept fewer bytes than
/// offered when the backend is out of room.
pub trait Backend {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    fn seek(&mut self, pos: u64) -> Result<u64>;

    fn tell(&mut self) -> Result<u64>;

    fn close(&mut self) -> Result<()>;
}

/// Fixed size memory region.
#[derive(Debug, Clone)]
pub struct MemBackend {
    data: Vec<u8>,
    pos: usize,
    // high-water mark of valid bytes
    end: usize,
}

impl MemBackend {
    /// Backend to read `data` from.
    pub fn new(data: Vec<u8>) -> Self {
        let end = data.len();
        MemBackend { data, pos: 0, end }
    }

    /// Empty backend accepting at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        MemBackend {
            data: vec![0; capacity],
            pos: 0,
            end: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.end]
    }

    pub fn into_inner(mut self) -> Vec<u8> {
        self.data.truncate(self.end);
        self.data
    }
}

impl Backend for MemBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.end.saturating_sub(self.pos));
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        self.data[self.pos..self.pos + n].copy_from_slice(&buf[..n]);
        self.pos += n;
        self.end = self.end.max(self.pos);
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<u64> {
        self.pos = usize::try_from(pos).map_or(self.data.len(), |p| p.min(self.data.len()));
        Ok(self.pos as u64)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Backend over a file opened for reading, or created for writing.
#[derive(Debug)]
pub struct FileBackend {
    file: File,
}

impl FileBackend {
    pub fn new(file: File) -> Self {
        FileBackend { file }
    }

    pub fn open<P: AsRef<Path>>(path: P, mode: StmMode) -> Result<Self> {
        let path = path.as_ref();
        let file = match mode {
            StmMode::Read => File::open(path),
            StmMode::Write => File::create(path),
        }
        .map_err(|e| PdfError::Backend(format!("open {:?} failed:{:?}", path, e)))?;
        debug!("open file backend {:?} for {:?}", path, mode);
        Ok(FileBackend { file })
    }

    pub fn into_inner(self) -> File {
        self.file
    }
}

impl Backend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.file.write(buf)?)
    }

    fn seek(&mut self, pos: u64) -> Result<u64> {
        Ok(self.file.seek(SeekFrom::Start(pos))?)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.file.stream_position()?)
    }

    fn close(&mut self) -> Result<()> {
        Ok(self.file.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, MemBackend};

    #[test]
    fn test_mem_read() {
        let mut backend = MemBackend::new(b"0123456789".to_vec());
        let mut buf = [0u8; 4];
        assert_eq!(backend.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"0123");
        assert_eq!(backend.seek(8).unwrap(), 8);
        assert_eq!(backend.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
        assert_eq!(backend.read(&mut buf).unwrap(), 0);
        assert_eq!(backend.seek(100).unwrap(), 10);
    }

    #[test]
    fn test_mem_write_is_bounded() {
        let mut backend = MemBackend::with_capacity(6);
        assert_eq!(backend.write(b"abcd").unwrap(), 4);
        assert_eq!(backend.write(b"efgh").unwrap(), 2);
        assert_eq!(backend.write(b"ij").unwrap(), 0);
        assert_eq!(backend.tell().unwrap(), 6);
        backend.seek(1).unwrap();
        assert_eq!(backend.write(b"B").unwrap(), 1);
        assert_eq!(backend.as_bytes(), b"aBcdef");
        assert_eq!(backend.into_inner(), b"aBcdef");
    }

    #[test]
    fn test_mem_write_then_read() {
        let mut backend = MemBackend::with_capacity(8);
        backend.write(b"xyz").unwrap();
        backend.seek(0).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(backend.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"xyz");
    }
}
