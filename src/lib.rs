mod error;
pub mod config;
pub mod module;
pub mod proto;
pub mod transport;
pub mod util;

pub use error::*;
pub(crate) use error::ensure_buf_size;

pub type Result<T, E = Error> = std::result::Result<T, E>;
