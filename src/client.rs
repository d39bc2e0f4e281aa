//! Client configuration with builder pattern.
//!
//! # Example
//!
//! ```rust
//! use netexchange::client::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .follow_redirect(true)
//!     .max_redirects(10)
//!     .strict_302_handling(true)
//!     .build();
//!
//! assert_eq!(config.redirect_policy().max_redirects, 10);
//! ```

use crate::base::neterror::NetError;
use crate::cookies::decoder::{CookieDecoder, DefaultCookieDecoder};
use crate::filter::ResponseFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default redirect ceiling.
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Serializable redirect settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectPolicy {
    /// Follow redirects unless the request says otherwise.
    pub follow_redirect: bool,
    /// Hops allowed per exchange. The hop after the last allowed one fails.
    pub max_redirects: u32,
    /// Keep the method on 302 instead of switching to GET.
    pub strict_302_handling: bool,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            follow_redirect: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            strict_302_handling: false,
        }
    }
}

impl RedirectPolicy {
    /// Load from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, NetError> {
        serde_json::from_str(json).map_err(|e| NetError::invalid_config(e.to_string()))
    }
}

/// Configuration shared by every exchange of a client.
#[derive(Clone)]
pub struct ClientConfig {
    redirect: RedirectPolicy,
    response_filters: Vec<Arc<dyn ResponseFilter>>,
    cookie_decoder: Arc<dyn CookieDecoder>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("redirect", &self.redirect)
            .field("response_filters", &self.response_filters.len())
            .finish()
    }
}

impl ClientConfig {
    /// Create a new config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn redirect_policy(&self) -> &RedirectPolicy {
        &self.redirect
    }

    pub fn response_filters(&self) -> &[Arc<dyn ResponseFilter>] {
        &self.response_filters
    }

    pub fn cookie_decoder(&self) -> &Arc<dyn CookieDecoder> {
        &self.cookie_decoder
    }
}

/// Builder for creating a [`ClientConfig`].
#[derive(Default)]
pub struct ClientConfigBuilder {
    redirect: RedirectPolicy,
    response_filters: Vec<Arc<dyn ResponseFilter>>,
    cookie_decoder: Option<Arc<dyn CookieDecoder>>,
}

impl ClientConfigBuilder {
    /// Replace all redirect settings.
    pub fn redirect_policy(mut self, policy: RedirectPolicy) -> Self {
        self.redirect = policy;
        self
    }

    pub fn follow_redirect(mut self, follow: bool) -> Self {
        self.redirect.follow_redirect = follow;
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.redirect.max_redirects = max;
        self
    }

    pub fn strict_302_handling(mut self, strict: bool) -> Self {
        self.redirect.strict_302_handling = strict;
        self
    }

    /// Append a response filter. Filters run in the order they are added.
    pub fn response_filter<F: ResponseFilter + 'static>(mut self, filter: F) -> Self {
        self.response_filters.push(Arc::new(filter));
        self
    }

    /// Set the `Set-Cookie` decoder (defaults to [`DefaultCookieDecoder`]).
    pub fn cookie_decoder<D: CookieDecoder + 'static>(mut self, decoder: D) -> Self {
        self.cookie_decoder = Some(Arc::new(decoder));
        self
    }

    /// Build the config.
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            redirect: self.redirect,
            response_filters: self.response_filters,
            cookie_decoder: self
                .cookie_decoder
                .unwrap_or_else(|| Arc::new(DefaultCookieDecoder)),
        }
    }
}
