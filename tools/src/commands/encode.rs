use std::fs::File;
use std::io;
use std::path::Path;

use pdf_stm::{Backend, FilterMode, Result, StmMode, Stream, StreamOptions};

use super::{install_filters, FilterArgs};

pub fn command(
    input: &Path,
    output: &Path,
    options: StreamOptions,
    args: &FilterArgs,
) -> Result<u64> {
    let mut file = File::open(input)?;
    let mut stream = Stream::open_file(output, StmMode::Write, options)?;
    install_filters(&mut stream, args, FilterMode::Encode)?;
    io::copy(&mut file, &mut stream)?;
    let mut backend = stream.destroy()?;
    backend.tell()
}
