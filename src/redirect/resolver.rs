use crate::base::neterror::NetError;
use crate::client::RedirectPolicy;
use crate::cookies::decoder::CookieDecoder;
use crate::http::request::{Request, RequestBuilder};
use crate::http::response::HttpResponse;
use crate::redirect::policy::{
    carry_websocket_scheme, is_redirect_status, propagated_headers, redirect_method,
};
use crate::socket::channel::{Channel, ChannelManager, PartitionKey};
use crate::socket::reuse::{ChannelDisposition, ChannelReuseDecider};
use crate::urlrequest::exchange::Exchange;
use crate::urlrequest::sender::RequestSender;
use http::{header, Method};
use std::sync::Arc;

/// Turns redirect responses into the next request of the same exchange.
#[derive(Clone)]
pub struct RedirectResolver {
    policy: RedirectPolicy,
    /// Built once per configuration and cloned on every failure.
    max_redirect_error: NetError,
    cookie_decoder: Arc<dyn CookieDecoder>,
    reuse: ChannelReuseDecider,
}

impl RedirectResolver {
    pub fn new(policy: RedirectPolicy, cookie_decoder: Arc<dyn CookieDecoder>) -> Self {
        Self {
            max_redirect_error: NetError::MaxRedirectsExceeded {
                max: policy.max_redirects,
            },
            policy,
            cookie_decoder,
            reuse: ChannelReuseDecider,
        }
    }

    pub fn policy(&self) -> &RedirectPolicy {
        &self.policy
    }

    /// The request's own setting wins over the client default.
    pub fn follows(&self, request: &Request) -> bool {
        request
            .follow_redirect()
            .unwrap_or(self.policy.follow_redirect)
    }

    /// Follow `response` if it is a redirect.
    ///
    /// `Ok(true)` means the next request was dispatched and the response
    /// must not reach the handler. `Ok(false)` means deliver it as usual.
    pub fn try_redirect(
        &self,
        channel_manager: &dyn ChannelManager,
        sender: &dyn RequestSender,
        channel: &Channel,
        exchange: &mut Exchange,
        response: &HttpResponse,
    ) -> Result<bool, NetError> {
        let status = response.status();
        if !self.follows(exchange.request()) || !is_redirect_status(status) {
            return Ok(false);
        }

        let Some(next_request) = self.next_request(exchange, response)? else {
            return Ok(false);
        };

        // The connection still belongs to the previous hop.
        let original_url = exchange.request().url().clone();
        let keep_alive = exchange.is_keep_alive();
        let partition = exchange.partition().clone();

        let disposition = self.reuse.decide(
            keep_alive,
            response.is_chunked(),
            &original_url,
            next_request.url(),
        );
        tracing::debug!(
            exchange = exchange.id(),
            from = %original_url,
            to = %next_request.url(),
            ?disposition,
            "sending redirect"
        );
        self.reuse
            .apply(disposition, channel_manager, channel, keep_alive, &partition);
        exchange.set_reuse_channel(disposition == ChannelDisposition::Reuse);
        if disposition != ChannelDisposition::Reuse {
            // The next hop gets its own connection; later offers belong to its origin.
            exchange.set_partition(PartitionKey::from_url(next_request.url()));
        }

        sender.send_next_request(next_request, exchange)?;
        Ok(true)
    }

    /// Count the hop and build the next request, without touching the
    /// connection. `Ok(None)` when there is nowhere new to go.
    pub fn next_request(
        &self,
        exchange: &mut Exchange,
        response: &HttpResponse,
    ) -> Result<Option<Request>, NetError> {
        let status = response.status();

        exchange.increment_and_get_redirect_count();
        if exchange.redirect_count().exceeds(self.policy.max_redirects) {
            return Err(self.max_redirect_error.clone());
        }

        // A new target may need its own authentication handshake.
        exchange.get_and_set_auth(false);

        let Some(location) = response.location() else {
            tracing::debug!(
                exchange = exchange.id(),
                %status,
                "redirect without usable Location, delivering response"
            );
            return Ok(None);
        };
        let uri = match exchange.uri().join(location) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::debug!(
                    exchange = exchange.id(),
                    location,
                    error = %e,
                    "unparsable Location, delivering response"
                );
                return Ok(None);
            }
        };

        if uri == *exchange.uri() {
            tracing::debug!(exchange = exchange.id(), %uri, "redirect to current URI ignored");
            return Ok(None);
        }

        let original = exchange.request();
        let method = redirect_method(status, original.method(), self.policy.strict_302_handling);
        let next_url = carry_websocket_scheme(original.url(), uri.clone());
        tracing::debug!(exchange = exchange.id(), url = %next_url, "redirecting");

        let mut builder = RequestBuilder::from_request(original);
        if method != original.method() {
            builder = builder.method(method.clone());
            if method == Method::GET {
                builder = builder.clear_body();
            }
        }

        for value in response.headers().get_all(header::SET_COOKIE.as_str()) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            if let Some(cookie) = self.cookie_decoder.decode(value) {
                builder = builder.add_or_replace_cookie(cookie);
            }
        }

        let next_request = builder
            .headers(propagated_headers(original.headers()))
            .url(next_url)
            .build();

        exchange.set_uri(uri);
        Ok(Some(next_request))
    }
}
