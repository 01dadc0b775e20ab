use crate::buffer::Buffer;
use crate::error::Result;
use crate::filter::{Filter, FilterStatus};

/// Identity filter, every chain starts with one.
#[derive(Default)]
pub struct NullFilter {}

impl Filter for NullFilter {
    fn apply(
        &mut self,
        input: &mut Buffer,
        output: &mut Buffer,
        finish: bool,
    ) -> Result<FilterStatus> {
        input.transfer_to(output);
        if !input.is_at_end() {
            return Ok(FilterStatus::NeedsMoreOutput);
        }
        if finish {
            return Ok(FilterStatus::EndOfData);
        }
        Ok(FilterStatus::NeedsMoreInput)
    }
}
