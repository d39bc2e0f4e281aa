//! In-flight exchange state.
//!
//! An [`Exchange`] is owned by whichever worker currently drives its
//! connection and is only ever mutated through `&mut`. Handing it to another
//! worker means moving it.

use crate::base::neterror::NetError;
use crate::http::request::Request;
use crate::socket::channel::PartitionKey;
use crate::urlrequest::handler::AsyncHandler;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

static NEXT_EXCHANGE_ID: AtomicU64 = AtomicU64::new(1);

/// Redirect hops taken by one exchange. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedirectCounter(u32);

impl RedirectCounter {
    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn increment_and_get(&mut self) -> u32 {
        self.0 = self.0.saturating_add(1);
        self.0
    }

    /// True once more hops were taken than `max` allows.
    pub fn exceeds(&self, max: u32) -> bool {
        self.0 > max
    }
}

/// One logical request/response cycle.
pub struct Exchange {
    id: u64,
    request: Request,
    uri: Url,
    redirect_count: RedirectCounter,
    keep_alive: bool,
    partition: PartitionKey,
    auth: bool,
    handler: Arc<dyn AsyncHandler>,
    reuse_channel: bool,
    done: bool,
}

impl Exchange {
    pub fn new(request: Request, handler: Arc<dyn AsyncHandler>) -> Self {
        let uri = request.url().clone();
        let partition = PartitionKey::from_url(&uri);
        Self {
            id: NEXT_EXCHANGE_ID.fetch_add(1, Ordering::Relaxed),
            request,
            uri,
            redirect_count: RedirectCounter::default(),
            keep_alive: true,
            partition,
            auth: false,
            handler,
            reuse_channel: false,
            done: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn set_request(&mut self, request: Request) {
        self.request = request;
    }

    /// URI the exchange currently targets. Redirect locations resolve
    /// against this, not against the original request.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: Url) {
        self.uri = uri;
    }

    pub fn redirect_count(&self) -> RedirectCounter {
        self.redirect_count
    }

    pub fn increment_and_get_redirect_count(&mut self) -> u32 {
        self.redirect_count.increment_and_get()
    }

    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    pub fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    pub fn set_partition(&mut self, partition: PartitionKey) {
        self.partition = partition;
    }

    /// Whether an authentication retry already happened.
    pub fn is_auth(&self) -> bool {
        self.auth
    }

    /// Set the auth-retried flag, returning the previous value.
    pub fn get_and_set_auth(&mut self, auth: bool) -> bool {
        std::mem::replace(&mut self.auth, auth)
    }

    pub fn handler(&self) -> &Arc<dyn AsyncHandler> {
        &self.handler
    }

    pub fn set_handler(&mut self, handler: Arc<dyn AsyncHandler>) {
        self.handler = handler;
    }

    /// The next request should go out on the connection already bound to
    /// this exchange.
    pub fn reuse_channel(&self) -> bool {
        self.reuse_channel
    }

    pub fn set_reuse_channel(&mut self, reuse: bool) {
        self.reuse_channel = reuse;
    }

    /// Read and clear the reuse flag.
    pub fn take_reuse_channel(&mut self) -> bool {
        std::mem::take(&mut self.reuse_channel)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Finish the exchange with `error`. The handler is notified only the
    /// first time.
    pub fn abort(&mut self, error: &NetError) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        self.handler.on_throwable(error);
        true
    }
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("id", &self.id)
            .field("method", self.request.method())
            .field("uri", &self.uri.as_str())
            .field("redirect_count", &self.redirect_count.get())
            .field("keep_alive", &self.keep_alive)
            .field("partition", &self.partition)
            .field("auth", &self.auth)
            .field("reuse_channel", &self.reuse_channel)
            .field("done", &self.done)
            .finish()
    }
}
