use super::{FIRST_CODE, MAX_DICT_SIZE};

/// Marks a missing link between entries.
pub(crate) const NULL_INDEX: u16 = u16::MAX;

#[derive(Debug, Clone, Copy)]
struct Entry {
    prefix: u16,
    suffix: u8,
    // root of the binary search tree holding the extensions of this entry
    first: u16,
    left: u16,
    right: u16,
}

impl Default for Entry {
    fn default() -> Self {
        Entry {
            prefix: NULL_INDEX,
            suffix: 0,
            first: NULL_INDEX,
            left: NULL_INDEX,
            right: NULL_INDEX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    Found(u16),
    Inserted(u16),
    Full,
}

/// LZW string table kept as a trie inside a flat arena.
///
/// Codes below 256 are the single byte strings, 256 and 257 are the control
/// codes and never carry a string.
pub(crate) struct Dictionary {
    entries: Vec<Entry>,
    size: u16,
}

impl Dictionary {
    pub fn new() -> Self {
        let mut entries = vec![Entry::default(); MAX_DICT_SIZE as usize];
        for (i, e) in entries.iter_mut().enumerate().take(256) {
            e.suffix = i as u8;
        }
        Dictionary {
            entries,
            size: FIRST_CODE,
        }
    }

    pub fn reset(&mut self) {
        for e in self.entries.iter_mut().take(256) {
            e.first = NULL_INDEX;
        }
        self.size = FIRST_CODE;
    }

    /// Next code to be assigned.
    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn is_full(&self) -> bool {
        self.size == MAX_DICT_SIZE
    }

    /// Append `prefix + suffix` without linking it into the search tree.
    pub fn push(&mut self, prefix: u16, suffix: u8) -> Option<u16> {
        if self.is_full() {
            return None;
        }
        let code = self.size;
        self.entries[code as usize] = Entry {
            prefix,
            suffix,
            ..Entry::default()
        };
        self.size += 1;
        Some(code)
    }

    /// Look up `prefix + suffix`, adding it when absent.
    pub fn find_or_insert(&mut self, prefix: u16, suffix: u8) -> Lookup {
        let mut idx = self.entries[prefix as usize].first;
        if idx == NULL_INDEX {
            return match self.push(prefix, suffix) {
                Some(code) => {
                    self.entries[prefix as usize].first = code;
                    Lookup::Inserted(code)
                }
                None => Lookup::Full,
            };
        }
        loop {
            let entry = self.entries[idx as usize];
            if entry.suffix == suffix {
                return Lookup::Found(idx);
            }
            let next = if suffix < entry.suffix {
                entry.left
            } else {
                entry.right
            };
            if next != NULL_INDEX {
                idx = next;
                continue;
            }
            let Some(code) = self.push(prefix, suffix) else {
                return Lookup::Full;
            };
            if suffix < entry.suffix {
                self.entries[idx as usize].left = code;
            } else {
                self.entries[idx as usize].right = code;
            }
            return Lookup::Inserted(code);
        }
    }

    /// Write the string of `code` so that it ends at `out.len()`, returning
    /// the index of its first byte.
    pub fn expand(&self, code: u16, out: &mut [u8]) -> Option<usize> {
        let mut pos = out.len();
        let mut c = code;
        loop {
            if pos == 0 {
                return None;
            }
            pos -= 1;
            let entry = &self.entries[c as usize];
            out[pos] = entry.suffix;
            if entry.prefix == NULL_INDEX {
                return Some(pos);
            }
            c = entry.prefix;
        }
    }
}
