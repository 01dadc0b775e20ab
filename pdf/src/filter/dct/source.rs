use log::warn;

/// End of image marker handed out once the cached data is used up, so a
/// decompressor reading past the end sees a terminated image.
const FAKE_EOI: [u8; 2] = [0xff, 0xd9];

/// Source manager feeding cached compressed bytes to a JPEG decompressor.
///
/// The decompressor pulls data with [`fill`](SourceManager::fill), drops
/// bytes it does not need with [`skip`](SourceManager::skip) and releases the
/// cache with [`term`](SourceManager::term).
#[derive(Debug, Default)]
pub struct SourceManager {
    data: Vec<u8>,
    pos: usize,
    terminated: bool,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn cached_len(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn fill(&mut self) -> &[u8] {
        if self.pos >= self.data.len() {
            warn!("JPEG source exhausted, inserting EOI marker");
            return &FAKE_EOI;
        }
        &self.data[self.pos..]
    }

    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    pub fn term(&mut self) {
        self.data = Vec::new();
        self.pos = 0;
        self.terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}
