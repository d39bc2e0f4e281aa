//! Request dispatch seam.
//!
//! The decision layer never performs I/O. Once it knows what to do next it
//! hands the work to a [`RequestSender`], which owns everything after that.

use crate::base::neterror::NetError;
use crate::filter::FilterContext;
use crate::http::request::Request;
use crate::socket::channel::{Channel, ChannelManager, PartitionKey};
use crate::urlrequest::exchange::Exchange;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Dispatches follow-up requests produced by redirect and filter handling.
pub trait RequestSender: Send + Sync {
    /// Send `request` as the next hop of `exchange`. When the exchange is
    /// flagged for channel reuse, the request goes out on its current
    /// connection.
    fn send_next_request(&self, request: Request, exchange: &mut Exchange) -> Result<(), NetError>;

    /// Replay the exchange with the request and handler of `context`.
    fn replay_request(
        &self,
        exchange: &mut Exchange,
        context: FilterContext,
        channel: &Channel,
    ) -> Result<(), NetError>;

    /// Release `channel` and fail the exchange with `error`.
    fn abort(&self, channel: &Channel, exchange: &mut Exchange, error: NetError);
}

/// Work item posted by [`QueuedRequestSender`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Send {
        exchange_id: u64,
        request: Request,
        reuse_channel: bool,
    },
    Replay {
        exchange_id: u64,
        request: Request,
    },
    Abort {
        exchange_id: u64,
        error: NetError,
    },
}

/// [`RequestSender`] that posts [`Dispatch`] commands to an async consumer.
///
/// The consumer side owns connection setup and I/O; this side only updates
/// exchange state and commits channel bookkeeping before posting.
#[derive(Clone)]
pub struct QueuedRequestSender {
    channel_manager: Arc<dyn ChannelManager>,
    tx: mpsc::UnboundedSender<Dispatch>,
}

impl QueuedRequestSender {
    pub fn new(
        channel_manager: Arc<dyn ChannelManager>,
    ) -> (Self, mpsc::UnboundedReceiver<Dispatch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { channel_manager, tx }, rx)
    }

    fn post(&self, dispatch: Dispatch) -> Result<(), NetError> {
        self.tx.send(dispatch).map_err(|_| NetError::DispatcherClosed)
    }
}

impl RequestSender for QueuedRequestSender {
    fn send_next_request(&self, request: Request, exchange: &mut Exchange) -> Result<(), NetError> {
        let reuse_channel = exchange.take_reuse_channel();
        exchange.set_request(request.clone());
        tracing::debug!(
            exchange = exchange.id(),
            url = %request.url(),
            reuse_channel,
            "dispatching next request"
        );
        self.post(Dispatch::Send {
            exchange_id: exchange.id(),
            request,
            reuse_channel,
        })
    }

    fn replay_request(
        &self,
        exchange: &mut Exchange,
        context: FilterContext,
        channel: &Channel,
    ) -> Result<(), NetError> {
        let (handler, request) = context.into_parts();

        exchange.set_handler(handler);
        exchange.set_uri(request.url().clone());
        exchange.set_request(request.clone());
        // Offered under the partition of the hop that owned the connection.
        self.channel_manager
            .drain_channel_and_offer(channel, exchange.is_keep_alive(), exchange.partition());
        exchange.set_partition(PartitionKey::from_url(request.url()));

        tracing::debug!(exchange = exchange.id(), url = %request.url(), "replaying request");
        self.post(Dispatch::Replay {
            exchange_id: exchange.id(),
            request,
        })
    }

    fn abort(&self, channel: &Channel, exchange: &mut Exchange, error: NetError) {
        self.channel_manager.close_channel(channel);
        if !exchange.abort(&error) {
            return;
        }
        tracing::debug!(exchange = exchange.id(), error = %error, "exchange aborted");
        if self
            .post(Dispatch::Abort {
                exchange_id: exchange.id(),
                error,
            })
            .is_err()
        {
            tracing::debug!(exchange = exchange.id(), "dispatcher gone, abort not posted");
        }
    }
}
