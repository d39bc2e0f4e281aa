use crate::base::neterror::NetError;

/// Receives the outcome of an exchange.
///
/// Response filters may wrap or replace the handler of an exchange, so it is
/// shared behind an `Arc<dyn AsyncHandler>`.
pub trait AsyncHandler: Send + Sync {
    /// The exchange failed and will not produce a response.
    fn on_throwable(&self, error: &NetError);
}
