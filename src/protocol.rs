//! Per-exchange response dispatch decision.
//!
//! A [`Protocol`] is chosen when the exchange is set up, from the request
//! scheme. Plain HTTP and WebSocket share redirect and filter handling and
//! differ only in what a response that nobody intercepted means.

use crate::base::neterror::NetError;
use crate::client::ClientConfig;
use crate::filter::{FilterChain, FilterOutcome};
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::response::HttpResponse;
use crate::redirect::resolver::RedirectResolver;
use crate::socket::channel::{Channel, ChannelManager};
use crate::urlrequest::exchange::Exchange;
use crate::urlrequest::sender::RequestSender;
use http::{header, StatusCode};
use std::sync::Arc;
use url::Url;

/// Protocol variant of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    Http,
    WebSocket,
}

impl ProtocolKind {
    pub fn for_url(url: &Url) -> Result<Self, NetError> {
        match url.scheme() {
            "http" | "https" => Ok(ProtocolKind::Http),
            "ws" | "wss" => Ok(ProtocolKind::WebSocket),
            _ => Err(NetError::DisallowedUrlScheme),
        }
    }
}

/// What the caller does with a response after [`Protocol::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDisposition {
    /// A redirect was dispatched. Do not deliver.
    Redirected,
    /// A filter replay was dispatched. Do not deliver.
    Replayed,
    /// The exchange failed and the handler was notified. Do not deliver.
    Aborted,
    /// Hand the response to the exchange's handler.
    Deliver,
    /// WebSocket handshake accepted; switch the connection to frames.
    Upgrade,
}

/// Post-response decisions for one protocol variant.
#[derive(Clone)]
pub struct Protocol {
    kind: ProtocolKind,
    redirect: RedirectResolver,
    filters: FilterChain,
    channel_manager: Arc<dyn ChannelManager>,
    sender: Arc<dyn RequestSender>,
}

impl Protocol {
    pub fn new(
        kind: ProtocolKind,
        config: &ClientConfig,
        channel_manager: Arc<dyn ChannelManager>,
        sender: Arc<dyn RequestSender>,
    ) -> Self {
        Self {
            kind,
            redirect: RedirectResolver::new(
                *config.redirect_policy(),
                config.cookie_decoder().clone(),
            ),
            filters: FilterChain::new(config.response_filters().to_vec()),
            channel_manager,
            sender,
        }
    }

    /// Pick the variant matching the scheme of `url`.
    pub fn for_url(
        url: &Url,
        config: &ClientConfig,
        channel_manager: Arc<dyn ChannelManager>,
        sender: Arc<dyn RequestSender>,
    ) -> Result<Self, NetError> {
        Ok(Self::new(ProtocolKind::for_url(url)?, config, channel_manager, sender))
    }

    pub fn kind(&self) -> ProtocolKind {
        self.kind
    }

    /// `true` when the response was handled by dispatching a redirect.
    pub fn try_redirect(
        &self,
        channel: &Channel,
        exchange: &mut Exchange,
        response: &HttpResponse,
    ) -> Result<bool, NetError> {
        self.redirect.try_redirect(
            self.channel_manager.as_ref(),
            self.sender.as_ref(),
            channel,
            exchange,
            response,
        )
    }

    /// `true` when the filter chain consumed the response, either through a
    /// replay or by aborting the exchange. The chain reads the handler and
    /// request from `exchange`.
    pub fn try_filters(
        &self,
        channel: &Channel,
        exchange: &mut Exchange,
        status: StatusCode,
        headers: &OrderedHeaderMap,
    ) -> Result<bool, NetError> {
        let outcome = self
            .filters
            .run(self.sender.as_ref(), channel, exchange, status, headers)?;
        Ok(outcome.is_handled())
    }

    /// Full decision for a freshly received response: redirect first, then
    /// filters, then the variant-specific delivery rule. Errors go through
    /// the abort path and never escape.
    pub fn handle(
        &self,
        channel: &Channel,
        exchange: &mut Exchange,
        response: &HttpResponse,
    ) -> ResponseDisposition {
        match self.try_redirect(channel, exchange, response) {
            Ok(true) => return ResponseDisposition::Redirected,
            Ok(false) => {}
            Err(e) => return self.abort(channel, exchange, e),
        }

        let outcome = self.filters.run(
            self.sender.as_ref(),
            channel,
            exchange,
            response.status(),
            response.headers(),
        );
        match outcome {
            Ok(FilterOutcome::NotHandled) => {}
            Ok(FilterOutcome::Replayed) => return ResponseDisposition::Replayed,
            Ok(FilterOutcome::Aborted) => return ResponseDisposition::Aborted,
            Err(e) => return self.abort(channel, exchange, e),
        }

        match self.kind {
            ProtocolKind::Http => ResponseDisposition::Deliver,
            ProtocolKind::WebSocket if is_websocket_upgrade(response) => {
                ResponseDisposition::Upgrade
            }
            ProtocolKind::WebSocket => {
                tracing::debug!(
                    exchange = exchange.id(),
                    status = %response.status(),
                    "invalid WebSocket handshake"
                );
                self.abort(channel, exchange, NetError::WsProtocolError)
            }
        }
    }

    fn abort(
        &self,
        channel: &Channel,
        exchange: &mut Exchange,
        error: NetError,
    ) -> ResponseDisposition {
        self.sender.abort(channel, exchange, error);
        ResponseDisposition::Aborted
    }
}

/// 101 with `Upgrade: websocket` and a `Connection` header listing `upgrade`.
fn is_websocket_upgrade(response: &HttpResponse) -> bool {
    if response.status() != StatusCode::SWITCHING_PROTOCOLS {
        return false;
    }
    let headers = response.headers();
    let upgrade = headers
        .get(header::UPGRADE.as_str())
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("websocket"));
    let connection = headers
        .get_all(header::CONNECTION.as_str())
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
    upgrade && connection
}
