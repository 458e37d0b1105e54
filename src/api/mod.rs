pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, TransportError};
pub use transport::{HttpTransport, Method, Request, Response, Transport};
