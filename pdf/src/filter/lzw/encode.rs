use super::bits::CodeWriter;
use super::dict::{Dictionary, Lookup};
use super::{early_change, width_exceeded, CLEAR_CODE, EOD_CODE, MIN_BITS};
use crate::buffer::Buffer;
use crate::error::Result;
use crate::filter::{Filter, FilterStatus};
use crate::params::FilterParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodeState {
    Start,
    Body,
    Done,
}

pub struct LZWEncode {
    dict: Dictionary,
    writer: CodeWriter,
    early_change: u16,
    // code of the string matched so far
    prefix: Option<u16>,
    // a code went out since the last clear, so the decoder is one entry behind
    emitted: bool,
    state: EncodeState,
}

impl LZWEncode {
    pub fn new(params: &FilterParams) -> Result<Self> {
        Ok(LZWEncode {
            dict: Dictionary::new(),
            writer: CodeWriter::new(),
            early_change: early_change(params)?,
            prefix: None,
            emitted: false,
            state: EncodeState::Start,
        })
    }

    fn push(&mut self, b: u8) {
        let Some(prefix) = self.prefix else {
            self.prefix = Some(b as u16);
            return;
        };
        match self.dict.find_or_insert(prefix, b) {
            Lookup::Found(code) => self.prefix = Some(code),
            Lookup::Inserted(_) | Lookup::Full => {
                self.writer.put(prefix);
                self.emitted = true;
                self.prefix = Some(b as u16);
                self.check_table();
            }
        }
    }

    fn check_table(&mut self) {
        // the decoder adds its entry one code later, hence size - 1
        if width_exceeded(self.dict.size() - 1, self.early_change, self.writer.width())
            && self.writer.inc_width()
        {
            return;
        }
        if self.dict.is_full() {
            self.writer.put(CLEAR_CODE);
            self.writer.set_width(MIN_BITS);
            self.dict.reset();
            self.emitted = false;
        }
    }

    fn put_trailer(&mut self) {
        if let Some(prefix) = self.prefix.take() {
            self.writer.put(prefix);
            if self.emitted
                && width_exceeded(self.dict.size(), self.early_change, self.writer.width())
            {
                self.writer.inc_width();
            }
        }
        self.writer.put(EOD_CODE);
        self.writer.pad();
    }
}

impl Filter for LZWEncode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        loop {
            if !self.writer.drain(output) {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            match self.state {
                EncodeState::Start => {
                    self.writer.put(CLEAR_CODE);
                    self.state = EncodeState::Body;
                }
                EncodeState::Body => match input.get_byte() {
                    Some(b) => self.push(b),
                    None if finish => {
                        self.put_trailer();
                        self.state = EncodeState::Done;
                    }
                    None => return Ok(FilterStatus::NeedsMoreInput),
                },
                EncodeState::Done => return Ok(FilterStatus::EndOfData),
            }
        }
    }
}
