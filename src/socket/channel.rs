//! Connection handles and the channel manager seam.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a transport connection.
///
/// Cloning yields another handle to the same connection. The socket itself
/// is owned by the transport; this crate only decides what happens to it.
#[derive(Clone)]
pub struct Channel {
    id: u64,
    open: Arc<AtomicBool>,
}

impl Channel {
    pub fn new() -> Self {
        Self {
            id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Mark the connection closed. Idempotent.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Channel {}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Identifies a connection pool bucket (scheme, host, port).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// `scheme://host:port` of `url`, with the scheme's default port filled in.
    pub fn from_url(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default();
        match url.port_or_known_default() {
            Some(port) => Self(format!("{}://{}:{}", url.scheme(), host, port)),
            None => Self(format!("{}://{}", url.scheme(), host)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection lifecycle operations the transport provides.
pub trait ChannelManager: Send + Sync {
    /// Return `channel` to the pool under `partition` once its current
    /// response has been fully read. A channel that was not keep-alive is
    /// closed instead.
    fn drain_channel_and_offer(
        &self,
        channel: &Channel,
        keep_alive: bool,
        partition: &PartitionKey,
    );

    /// Close `channel` immediately.
    fn close_channel(&self, channel: &Channel);
}
