//! Connection disposition when an exchange is redirected.
//!
//! A redirected request either keeps riding the current connection, hands it
//! back to the pool for someone else, or forces it closed. The decision has
//! to be committed before the next request is dispatched, otherwise the pool
//! could hand the same connection to another exchange while the redirect is
//! still using it.

use crate::socket::channel::{Channel, ChannelManager, PartitionKey};
use url::Url;

/// What happens to the current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDisposition {
    /// Same origin: the redirected request goes out on the current connection.
    Reuse,
    /// Different origin: the connection is drained and offered to the pool.
    Offer,
    /// Not keep-alive, or the body is chunked: the connection is closed.
    Close,
}

/// Decides and commits the connection disposition for a redirect.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelReuseDecider;

impl ChannelReuseDecider {
    /// Pure decision, no side effects.
    pub fn decide(
        &self,
        keep_alive: bool,
        response_chunked: bool,
        original: &Url,
        next: &Url,
    ) -> ChannelDisposition {
        if !keep_alive || response_chunked {
            return ChannelDisposition::Close;
        }
        if same_origin(original, next) {
            ChannelDisposition::Reuse
        } else {
            ChannelDisposition::Offer
        }
    }

    /// Commit `disposition` through `manager`. `keep_alive` and `partition`
    /// must describe the connection as it was before the redirect.
    pub fn apply(
        &self,
        disposition: ChannelDisposition,
        manager: &dyn ChannelManager,
        channel: &Channel,
        keep_alive: bool,
        partition: &PartitionKey,
    ) {
        match disposition {
            ChannelDisposition::Reuse => {}
            ChannelDisposition::Offer => {
                manager.drain_channel_and_offer(channel, keep_alive, partition)
            }
            ChannelDisposition::Close => manager.close_channel(channel),
        }
    }
}

/// Scheme, host and port all match. Missing ports compare as the scheme default.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
