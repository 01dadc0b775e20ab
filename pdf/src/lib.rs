mod character;

pub mod backend;
pub mod buffer;
pub mod chain;
pub mod error;
pub mod filter;
pub mod params;
pub mod stream;

pub use backend::{Backend, FileBackend, MemBackend};
pub use buffer::Buffer;
pub use error::{PdfError, Result};
pub use filter::{Filter, FilterMode, FilterStatus, FilterType};
pub use params::{FilterParams, ParamValue};
pub use stream::{StmMode, Stream, StreamOptions, Transfer};
