//! Transparent redirect following.
//!
//! - [`policy`]: followed statuses, propagated headers, method rewrite rule
//! - [`resolver`]: budget enforcement and next-request synthesis

pub mod policy;
pub mod resolver;

pub use policy::{PROPAGATED_ON_REDIRECT_HEADERS, REDIRECT_STATUSES};
pub use resolver::RedirectResolver;
