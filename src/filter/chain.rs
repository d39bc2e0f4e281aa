use crate::base::neterror::NetError;
use crate::filter::{FilterContext, ResponseFilter};
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::socket::channel::Channel;
use crate::urlrequest::exchange::Exchange;
use crate::urlrequest::sender::RequestSender;
use http::StatusCode;
use std::sync::Arc;

/// Result of running the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Deliver the response to the handler as usual.
    NotHandled,
    /// A replay was dispatched; the response must not be delivered.
    Replayed,
    /// A filter failed and the exchange was aborted.
    Aborted,
}

impl FilterOutcome {
    /// The response was consumed by the chain.
    pub fn is_handled(self) -> bool {
        self != FilterOutcome::NotHandled
    }
}

/// Ordered response filters, shared read-only across exchanges.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn ResponseFilter>>,
}

impl FilterChain {
    pub fn new(filters: Vec<Arc<dyn ResponseFilter>>) -> Self {
        Self { filters }
    }

    /// Run every filter in registration order on the calling task.
    ///
    /// The final context's handler always replaces the exchange's handler.
    /// A replay is dispatched at most once, after the last filter.
    pub fn run(
        &self,
        sender: &dyn RequestSender,
        channel: &Channel,
        exchange: &mut Exchange,
        status: StatusCode,
        headers: &OrderedHeaderMap,
    ) -> Result<FilterOutcome, NetError> {
        if self.filters.is_empty() {
            return Ok(FilterOutcome::NotHandled);
        }

        let mut context = FilterContext::new(exchange.handler().clone(), exchange.request().clone())
            .with_response(status, headers.clone());

        for (idx, filter) in self.filters.iter().enumerate() {
            context = match filter.filter(context) {
                Ok(next) => next,
                Err(e) => {
                    tracing::debug!(
                        exchange = exchange.id(),
                        filter = idx,
                        error = %e,
                        "response filter failed"
                    );
                    sender.abort(channel, exchange, NetError::Filter(e));
                    return Ok(FilterOutcome::Aborted);
                }
            };
        }

        // The handler may have been wrapped.
        exchange.set_handler(context.handler().clone());

        if context.replay_request() {
            sender.replay_request(exchange, context, channel)?;
            return Ok(FilterOutcome::Replayed);
        }
        Ok(FilterOutcome::NotHandled)
    }
}
