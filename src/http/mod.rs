//! HTTP request and response values shaped by this crate.

pub mod orderedheaders;
pub mod request;
pub mod response;

// Re-exports for convenience
pub use orderedheaders::OrderedHeaderMap;
pub use request::{Request, RequestBuilder};
pub use response::HttpResponse;
