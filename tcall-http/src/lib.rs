#![forbid(unsafe_code)]

mod error;
mod headers;
mod options;
mod transport;
mod types;

pub use error::{Error, ErrorKind, Result};
pub use headers::{CONTEXT_TTL_MS, DEFAULT_TTL, RPC_CALLER, RPC_PROCEDURE, RPC_SERVICE};
pub use options::HttpOptions;
pub use transport::HttpTransport;
pub use types::{Request, Response};
