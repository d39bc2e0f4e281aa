//! Connection handles, pooling, and reuse decisions.
//!
//! - [`channel`]: connection handles, partition keys and the
//!   [`ChannelManager`](channel::ChannelManager) seam
//! - [`pool`]: idle channel pool keyed by partition
//! - [`reuse`]: whether a redirect may keep the current connection

pub mod channel;
pub mod pool;
pub mod reuse;

pub use channel::{Channel, ChannelManager, PartitionKey};
pub use pool::IdleChannelPool;
pub use reuse::{ChannelDisposition, ChannelReuseDecider};
