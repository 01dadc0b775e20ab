use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Invalid operation:{0}")]
    InvalidOperation(String),

    #[error("Invalid parameter:{0}")]
    InvalidParameter(String),

    #[error("Out of memory:{0}")]
    OutOfMemory(String),

    #[error("Filter error:{0}")]
    Filter(String),

    #[error("Backend error:{0}")]
    Backend(String),

    #[error("IO error:{0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;
