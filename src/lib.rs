//! # netexchange
//!
//! The post-response decision layer of an HTTP client transport.
//!
//! Given a freshly received response for an in-flight exchange, `netexchange`
//! decides whether the response is a redirect to follow transparently, and
//! whether a chain of response filters wants to replay the exchange instead
//! of delivering it. Socket I/O, TLS, DNS and wire parsing stay with the
//! transport; this crate only decides and hands off.
//!
//! ## Features
//!
//! - **Redirects**: 301/302/303/307 with browser method rewriting, strict 302 mode,
//!   cookie and header propagation, loop guard and hop budget
//! - **Connection Reuse**: same-origin redirects keep the connection, others
//!   return it to the pool, chunked or non keep-alive ones close it
//! - **Response Filters**: ordered interception with handler wrapping and replay
//! - **Dispatch**: message-passing hand-off to an async request sender
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netexchange::client::ClientConfig;
//! use netexchange::protocol::{Protocol, ResponseDisposition};
//! use netexchange::socket::IdleChannelPool;
//! use netexchange::urlrequest::QueuedRequestSender;
//! use std::sync::Arc;
//!
//! let pool = Arc::new(IdleChannelPool::new());
//! let (sender, mut dispatches) = QueuedRequestSender::new(pool.clone());
//! let config = ClientConfig::builder().follow_redirect(true).build();
//! let protocol = Protocol::for_url(exchange.uri(), &config, pool, Arc::new(sender))?;
//!
//! match protocol.handle(&channel, &mut exchange, &response) {
//!     ResponseDisposition::Deliver => deliver(response),
//!     _ => {} // a follow-up was dispatched or the exchange was aborted
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`client`] - Client configuration
//! - [`cookies`] - Cookie values and `Set-Cookie` decoding
//! - [`filter`] - Response filters and the filter chain
//! - [`http`] - Request and response values
//! - [`protocol`] - Response dispatch decision per protocol variant
//! - [`redirect`] - Redirect resolution
//! - [`socket`] - Channels, pool and reuse decisions
//! - [`urlrequest`] - Exchange state, handler and request sender

pub mod base;
pub mod client;
pub mod cookies;
pub mod filter;
pub mod http;
pub mod protocol;
pub mod redirect;
pub mod socket;
pub mod urlrequest;
