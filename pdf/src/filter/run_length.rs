use std::collections::VecDeque;

use log::warn;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::filter::{Filter, FilterStatus};

const EOD: u8 = 128;
const MAX_RUN: usize = 128;

#[derive(Default)]
pub struct RunLengthEncode {
    literal: Vec<u8>,
    run_byte: u8,
    run_len: usize,
    pending: VecDeque<u8>,
    terminated: bool,
}

impl RunLengthEncode {
    fn push(&mut self, b: u8) {
        if self.run_len > 0 {
            if b == self.run_byte && self.run_len < MAX_RUN {
                self.run_len += 1;
                return;
            }
            self.flush_run();
        }
        if self.literal.last() == Some(&b) {
            self.literal.pop();
            self.flush_literal();
            self.run_byte = b;
            self.run_len = 2;
            return;
        }
        self.literal.push(b);
        if self.literal.len() == MAX_RUN {
            self.flush_literal();
        }
    }

    fn flush_run(&mut self) {
        if self.run_len == 0 {
            return;
        }
        self.pending.push_back((257 - self.run_len) as u8);
        self.pending.push_back(self.run_byte);
        self.run_len = 0;
    }

    fn flush_literal(&mut self) {
        if self.literal.is_empty() {
            return;
        }
        self.pending.push_back((self.literal.len() - 1) as u8);
        self.pending.extend(self.literal.drain(..));
    }

    fn drain(&mut self, output: &mut Buffer) -> bool {
        while let Some(b) = self.pending.front() {
            if !output.put_byte(*b) {
                return false;
            }
            self.pending.pop_front();
        }
        true
    }
}

impl Filter for RunLengthEncode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        loop {
            if !self.drain(output) {
                return Ok(FilterStatus::NeedsMoreOutput);
            }
            if self.terminated {
                return Ok(FilterStatus::EndOfData);
            }
            if let Some(b) = input.get_byte() {
                self.push(b);
                continue;
            }
            if !finish {
                return Ok(FilterStatus::NeedsMoreInput);
            }
            self.flush_run();
            self.flush_literal();
            self.pending.push_back(EOD);
            self.terminated = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DecodeState {
    #[default]
    Length,
    Literal(usize),
    Repeat(usize),
    Emit { byte: u8, remaining: usize },
    Done,
}

#[derive(Default)]
pub struct RunLengthDecode {
    state: DecodeState,
}

impl RunLengthDecode {
    fn input_exhausted(&mut self, finish: bool) -> FilterStatus {
        if !finish {
            return FilterStatus::NeedsMoreInput;
        }
        if self.state != DecodeState::Length {
            warn!("RunLength stream truncated in state {:?}", self.state);
        }
        self.state = DecodeState::Done;
        FilterStatus::EndOfData
    }
}

impl Filter for RunLengthDecode {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        loop {
            match self.state {
                DecodeState::Done => return Ok(FilterStatus::EndOfData),
                DecodeState::Length => match input.get_byte() {
                    None => return Ok(self.input_exhausted(finish)),
                    Some(EOD) => self.state = DecodeState::Done,
                    Some(n) if n < EOD => self.state = DecodeState::Literal(n as usize + 1),
                    Some(n) => self.state = DecodeState::Repeat(257 - n as usize),
                },
                DecodeState::Literal(remaining) => {
                    if output.is_full() {
                        return Ok(FilterStatus::NeedsMoreOutput);
                    }
                    if input.is_at_end() {
                        return Ok(self.input_exhausted(finish));
                    }
                    let n = remaining.min(input.available()).min(output.free_space());
                    output.write_from(&input.unread()[..n]);
                    input.consume(n);
                    self.state = if n == remaining {
                        DecodeState::Length
                    } else {
                        DecodeState::Literal(remaining - n)
                    };
                }
                DecodeState::Repeat(count) => match input.get_byte() {
                    None => return Ok(self.input_exhausted(finish)),
                    Some(byte) => {
                        self.state = DecodeState::Emit {
                            byte,
                            remaining: count,
                        }
                    }
                },
                DecodeState::Emit { byte, remaining } => {
                    let n = remaining.min(output.free_space());
                    for _ in 0..n {
                        output.put_byte(byte);
                    }
                    if n < remaining {
                        self.state = DecodeState::Emit {
                            byte,
                            remaining: remaining - n,
                        };
                        return Ok(FilterStatus::NeedsMoreOutput);
                    }
                    self.state = DecodeState::Length;
                }
            }
        }
    }
}
