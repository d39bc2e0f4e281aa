use crate::socket::channel::{Channel, ChannelManager, PartitionKey};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Idle channels are dropped after this long without a taker.
const IDLE_TIMEOUT: Duration = Duration::from_secs(300); // 5 minutes

/// Idle channel with metadata for timeout tracking.
struct IdleChannel {
    channel: Channel,
    /// When this channel was returned to the pool
    start_time: Instant,
}

/// A channel waiting for its current response body to finish before it can
/// be offered.
struct PendingDrain {
    channel: Channel,
    keep_alive: bool,
    partition: PartitionKey,
}

/// Keeps reusable channels bucketed by partition key.
///
/// Offered channels first sit in a drain queue until the transport reports
/// that the in-flight body has been consumed ([`IdleChannelPool::complete_drain`]).
pub struct IdleChannelPool {
    max_idle_per_partition: usize, // Default 6

    partitions: Arc<DashMap<PartitionKey, VecDeque<IdleChannel>>>,
    draining: Arc<DashMap<u64, PendingDrain>>,
}

impl Clone for IdleChannelPool {
    fn clone(&self) -> Self {
        Self {
            max_idle_per_partition: self.max_idle_per_partition,
            partitions: Arc::clone(&self.partitions),
            draining: Arc::clone(&self.draining),
        }
    }
}

impl std::fmt::Debug for IdleChannelPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdleChannelPool")
            .field("max_idle_per_partition", &self.max_idle_per_partition)
            .field("idle", &self.idle_channel_count())
            .field("draining", &self.pending_drain_count())
            .finish()
    }
}

impl Default for IdleChannelPool {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleChannelPool {
    pub fn new() -> Self {
        Self::with_max_idle_per_partition(6)
    }

    pub fn with_max_idle_per_partition(max_idle_per_partition: usize) -> Self {
        Self {
            max_idle_per_partition,
            partitions: Arc::new(DashMap::new()),
            draining: Arc::new(DashMap::new()),
        }
    }

    /// The transport finished reading the body on `channel`; offer it if it
    /// was queued for draining.
    pub fn complete_drain(&self, channel: &Channel) {
        let Some((_, pending)) = self.draining.remove(&channel.id()) else {
            return;
        };

        if pending.keep_alive && pending.channel.is_open() {
            self.offer(pending.channel, pending.partition);
        } else {
            pending.channel.close();
        }
    }

    /// Take an idle, still-open channel for `partition`.
    pub fn poll(&self, partition: &PartitionKey) -> Option<Channel> {
        let mut idle = self.partitions.get_mut(partition)?;
        while let Some(entry) = idle.pop_front() {
            if entry.channel.is_open() {
                return Some(entry.channel);
            }
            // Dead channel, continue to next
        }
        None
    }

    /// Get total idle channel count across all partitions.
    pub fn idle_channel_count(&self) -> usize {
        self.partitions.iter().map(|p| p.len()).sum()
    }

    /// Channels still waiting for [`IdleChannelPool::complete_drain`].
    pub fn pending_drain_count(&self) -> usize {
        self.draining.len()
    }

    pub fn is_draining(&self, channel: &Channel) -> bool {
        self.draining.contains_key(&channel.id())
    }

    /// Drop idle channels that timed out or were closed underneath us.
    pub fn cleanup_idle_channels(&self) {
        self.cleanup_idle_channels_at(Instant::now());
    }

    fn cleanup_idle_channels_at(&self, now: Instant) {
        let mut empty = Vec::new();

        for mut entry in self.partitions.iter_mut() {
            entry.value_mut().retain(|idle| {
                let keep = now.duration_since(idle.start_time) < IDLE_TIMEOUT
                    && idle.channel.is_open();
                if !keep {
                    idle.channel.close();
                }
                keep
            });

            if entry.value().is_empty() {
                empty.push(entry.key().clone());
            }
        }

        for partition in empty {
            self.partitions.remove_if(&partition, |_, idle| idle.is_empty());
        }
    }

    /// Start a background task to periodically clean up idle channels.
    /// Should be called once during initialization.
    pub fn start_cleanup_task(self: &Arc<Self>) {
        const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

        let pool = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVAL).await;
                pool.cleanup_idle_channels();
            }
        });
    }

    fn offer(&self, channel: Channel, partition: PartitionKey) {
        let mut idle = self.partitions.entry(partition.clone()).or_default();
        if idle.len() >= self.max_idle_per_partition {
            tracing::debug!(
                partition = %partition,
                channel = channel.id(),
                "idle limit reached, closing channel"
            );
            channel.close();
            return;
        }
        tracing::debug!(partition = %partition, channel = channel.id(), "channel offered to pool");
        idle.push_back(IdleChannel {
            channel,
            start_time: Instant::now(),
        });
    }

    fn forget(&self, channel: &Channel) {
        self.draining.remove(&channel.id());
        for mut entry in self.partitions.iter_mut() {
            entry.value_mut().retain(|idle| idle.channel != *channel);
        }
    }
}

impl ChannelManager for IdleChannelPool {
    fn drain_channel_and_offer(
        &self,
        channel: &Channel,
        keep_alive: bool,
        partition: &PartitionKey,
    ) {
        self.draining.insert(
            channel.id(),
            PendingDrain {
                channel: channel.clone(),
                keep_alive,
                partition: partition.clone(),
            },
        );
    }

    fn close_channel(&self, channel: &Channel) {
        tracing::debug!(channel = channel.id(), "closing channel");
        channel.close();
        self.forget(channel);
    }
}
