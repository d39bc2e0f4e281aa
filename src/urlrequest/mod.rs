//! Exchange state and the collaborators that act on it.
//!
//! - [`exchange`]: the in-flight request/response unit and its redirect counter
//! - [`handler`]: the caller's response handler
//! - [`sender`]: dispatch of follow-up requests

pub mod exchange;
pub mod handler;
pub mod sender;

pub use exchange::{Exchange, RedirectCounter};
pub use handler::AsyncHandler;
pub use sender::{Dispatch, QueuedRequestSender, RequestSender};
