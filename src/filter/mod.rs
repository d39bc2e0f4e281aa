//! Response filters.
//!
//! A filter sees every response head before it reaches the handler. It can
//! swap the handler, rewrite the request and ask for the exchange to be
//! replayed. Filters run in registration order through [`FilterChain`].

pub mod chain;

pub use chain::{FilterChain, FilterOutcome};

use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::request::Request;
use crate::urlrequest::handler::AsyncHandler;
use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a [`ResponseFilter`]. Aborts the exchange.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FilterError {
    message: String,
}

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Value threaded through the filter chain. Filters take it by value and
/// return the context the next filter should see.
#[derive(Clone)]
pub struct FilterContext {
    handler: Arc<dyn AsyncHandler>,
    request: Request,
    response_status: Option<StatusCode>,
    response_headers: Option<OrderedHeaderMap>,
    replay_request: bool,
}

impl FilterContext {
    pub fn new(handler: Arc<dyn AsyncHandler>, request: Request) -> Self {
        Self {
            handler,
            request,
            response_status: None,
            response_headers: None,
            replay_request: false,
        }
    }

    pub fn with_response(mut self, status: StatusCode, headers: OrderedHeaderMap) -> Self {
        self.response_status = Some(status);
        self.response_headers = Some(headers);
        self
    }

    /// Replace the handler, typically with one wrapping the current handler.
    pub fn with_handler(mut self, handler: Arc<dyn AsyncHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Replace the request that a replay would send.
    pub fn with_request(mut self, request: Request) -> Self {
        self.request = request;
        self
    }

    /// Ask for the exchange to be replayed instead of delivered.
    pub fn replay(mut self) -> Self {
        self.replay_request = true;
        self
    }

    pub fn handler(&self) -> &Arc<dyn AsyncHandler> {
        &self.handler
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response_status(&self) -> Option<StatusCode> {
        self.response_status
    }

    pub fn response_headers(&self) -> Option<&OrderedHeaderMap> {
        self.response_headers.as_ref()
    }

    pub fn replay_request(&self) -> bool {
        self.replay_request
    }

    pub fn into_parts(self) -> (Arc<dyn AsyncHandler>, Request) {
        (self.handler, self.request)
    }
}

impl fmt::Debug for FilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterContext")
            .field("request", &self.request.url().as_str())
            .field("response_status", &self.response_status)
            .field("replay_request", &self.replay_request)
            .finish()
    }
}

/// Intercepts a response head.
///
/// Returning the context by value is the whole contract: there is no way to
/// hand back "no context".
pub trait ResponseFilter: Send + Sync {
    fn filter(&self, context: FilterContext) -> Result<FilterContext, FilterError>;
}

impl<F> ResponseFilter for F
where
    F: Fn(FilterContext) -> Result<FilterContext, FilterError> + Send + Sync,
{
    fn filter(&self, context: FilterContext) -> Result<FilterContext, FilterError> {
        self(context)
    }
}
