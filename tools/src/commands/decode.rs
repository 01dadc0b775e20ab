use std::fs::File;
use std::io;
use std::path::Path;

use pdf_stm::{FilterMode, Result, StmMode, Stream, StreamOptions};

use super::{install_filters, FilterArgs};

pub fn command(
    input: &Path,
    output: &Path,
    options: StreamOptions,
    args: &FilterArgs,
) -> Result<u64> {
    let mut stream = Stream::open_file(input, StmMode::Read, options)?;
    install_filters(&mut stream, args, FilterMode::Decode)?;
    let mut file = File::create(output)?;
    let n = io::copy(&mut stream, &mut file)?;
    stream.destroy()?;
    Ok(n)
}
