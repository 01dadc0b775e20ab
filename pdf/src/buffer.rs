use crate::error::{PdfError, Result};

/// Fixed capacity byte window shared between pipeline stages.
///
/// `read_pos <= write_pos <= size` always holds. The buffer never grows, the
/// owner checks [`Buffer::is_full`] before writing.
#[derive(Debug, Clone)]
pub struct Buffer {
    data: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

impl Buffer {
    pub fn new(size: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(size).map_err(|e| {
            PdfError::OutOfMemory(format!("Buffer of {} bytes: {:?}", size, e))
        })?;
        data.resize(size, 0);
        Ok(Buffer {
            data,
            read_pos: 0,
            write_pos: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn is_full(&self) -> bool {
        self.write_pos == self.data.len()
    }

    /// No unread bytes left.
    pub fn is_at_end(&self) -> bool {
        self.read_pos == self.write_pos
    }

    pub fn rewind(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// Move unread bytes to the front so the free tail is as large as possible.
    pub fn compact(&mut self) {
        if self.read_pos == 0 {
            return;
        }
        self.data.copy_within(self.read_pos..self.write_pos, 0);
        self.write_pos -= self.read_pos;
        self.read_pos = 0;
    }

    pub fn available(&self) -> usize {
        self.write_pos - self.read_pos
    }

    pub fn free_space(&self) -> usize {
        self.data.len() - self.write_pos
    }

    pub fn unread(&self) -> &[u8] {
        &self.data[self.read_pos..self.write_pos]
    }

    pub fn spare_mut(&mut self) -> &mut [u8] {
        let start = self.write_pos;
        &mut self.data[start..]
    }

    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        self.read_pos += n.min(self.available());
    }

    pub fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.free_space());
        self.write_pos += n.min(self.free_space());
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.unread().first().copied()
    }

    pub fn get_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.read_pos += 1;
        Some(b)
    }

    /// Returns false when the buffer is already full.
    pub fn put_byte(&mut self, b: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.data[self.write_pos] = b;
        self.write_pos += 1;
        true
    }

    /// Copy as much of `src` as fits, returning the number of bytes written.
    pub fn write_from(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.free_space());
        self.spare_mut()[..n].copy_from_slice(&src[..n]);
        self.write_pos += n;
        n
    }

    /// Copy unread bytes into `dst`, returning the number of bytes read.
    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.available());
        dst[..n].copy_from_slice(&self.data[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        n
    }

    /// Move as many unread bytes as fit into `other`.
    pub fn transfer_to(&mut self, other: &mut Buffer) -> usize {
        let n = self.available().min(other.free_space());
        let start = self.read_pos;
        other.write_from(&self.data[start..start + n]);
        self.read_pos += n;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::Buffer;

    #[test]
    fn test_cursors() {
        let mut buf = Buffer::new(4).unwrap();
        assert!(buf.is_at_end());
        assert!(!buf.is_full());
        assert_eq!(buf.write_from(b"abcdef"), 4);
        assert!(buf.is_full());
        assert_eq!(buf.get_byte(), Some(b'a'));
        assert!(!buf.put_byte(b'x'));
        let mut out = [0u8; 2];
        assert_eq!(buf.read_into(&mut out), 2);
        assert_eq!(&out, b"bc");
        buf.compact();
        assert_eq!(buf.unread(), b"d");
        assert_eq!(buf.free_space(), 3);
        buf.rewind();
        assert!(buf.is_at_end());
        assert_eq!(buf.read_pos(), 0);
        assert_eq!(buf.write_pos(), 0);
    }

    #[test]
    fn test_transfer() {
        let mut a = Buffer::new(8).unwrap();
        let mut b = Buffer::new(3).unwrap();
        a.write_from(b"hello");
        assert_eq!(a.transfer_to(&mut b), 3);
        assert_eq!(b.unread(), b"hel");
        assert_eq!(a.unread(), b"lo");
    }
}
