pub mod config;
pub mod handler;

pub use config::{RequestConfig, RetryPolicy};
pub use handler::{FetchError, HttpTransport, RequestHandler, Transport, TransportError};
