//! End-to-end response handling through `Protocol` with the queued sender
//! and the idle channel pool.

use http::{Method, StatusCode};
use netexchange::base::neterror::NetError;
use netexchange::client::ClientConfig;
use netexchange::filter::{FilterContext, FilterError};
use netexchange::http::{HttpResponse, OrderedHeaderMap, Request, RequestBuilder};
use netexchange::protocol::{Protocol, ProtocolKind, ResponseDisposition};
use netexchange::socket::{Channel, IdleChannelPool, PartitionKey};
use netexchange::urlrequest::{AsyncHandler, Dispatch, Exchange, QueuedRequestSender};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use url::Url;

#[derive(Default)]
struct CollectingHandler {
    errors: Mutex<Vec<NetError>>,
}

impl AsyncHandler for CollectingHandler {
    fn on_throwable(&self, error: &NetError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

struct Harness {
    pool: Arc<IdleChannelPool>,
    dispatches: mpsc::UnboundedReceiver<Dispatch>,
    protocol: Protocol,
    handler: Arc<CollectingHandler>,
    exchange: Exchange,
}

fn harness(url: &str, config: ClientConfig) -> Harness {
    let pool = Arc::new(IdleChannelPool::new());
    let (sender, dispatches) = QueuedRequestSender::new(pool.clone());
    let request = Request::builder(Method::GET, url).unwrap().build();
    let protocol =
        Protocol::for_url(request.url(), &config, pool.clone(), Arc::new(sender)).unwrap();
    let handler = Arc::new(CollectingHandler::default());
    let exchange = Exchange::new(request, handler.clone());
    Harness {
        pool,
        dispatches,
        protocol,
        handler,
        exchange,
    }
}

fn redirect(status: StatusCode, location: &str) -> HttpResponse {
    let mut headers = OrderedHeaderMap::new();
    headers.insert("Location", location).unwrap();
    HttpResponse::new(status, headers)
}

fn following() -> ClientConfig {
    ClientConfig::builder().follow_redirect(true).build()
}

fn partition(url: &str) -> PartitionKey {
    PartitionKey::from_url(&Url::parse(url).unwrap())
}

fn ok() -> HttpResponse {
    HttpResponse::new(StatusCode::OK, OrderedHeaderMap::new())
}

#[tokio::test]
async fn test_plain_response_delivered() {
    let mut h = harness("https://example.com/", following());
    let channel = Channel::new();

    assert_eq!(h.protocol.kind(), ProtocolKind::Http);
    assert_eq!(
        h.protocol.handle(&channel, &mut h.exchange, &ok()),
        ResponseDisposition::Deliver
    );
    assert!(h.dispatches.try_recv().is_err());
    assert!(channel.is_open());
}

#[tokio::test]
async fn test_same_origin_redirect_dispatched_on_same_channel() {
    let mut h = harness("https://example.com/a", following());
    let channel = Channel::new();

    let disposition = h
        .protocol
        .handle(&channel, &mut h.exchange, &redirect(StatusCode::FOUND, "/b"));
    assert_eq!(disposition, ResponseDisposition::Redirected);

    match h.dispatches.recv().await.unwrap() {
        Dispatch::Send {
            exchange_id,
            request,
            reuse_channel,
        } => {
            assert_eq!(exchange_id, h.exchange.id());
            assert_eq!(request.url().as_str(), "https://example.com/b");
            assert!(reuse_channel);
        }
        other => panic!("unexpected dispatch: {other:?}"),
    }
    assert_eq!(h.exchange.request().url().as_str(), "https://example.com/b");
    assert!(!h.exchange.reuse_channel());
    assert_eq!(h.pool.pending_drain_count(), 0);
}

#[tokio::test]
async fn test_cross_origin_redirect_offers_channel_to_pool() {
    let mut h = harness("https://a.example/", following());
    let channel = Channel::new();

    let response = redirect(StatusCode::MOVED_PERMANENTLY, "https://b.example/");
    let disposition = h.protocol.handle(&channel, &mut h.exchange, &response);
    assert_eq!(disposition, ResponseDisposition::Redirected);
    assert!(matches!(
        h.dispatches.recv().await,
        Some(Dispatch::Send { reuse_channel: false, .. })
    ));

    // Offered under the partition of the hop that owned the connection.
    assert!(h.pool.is_draining(&channel));
    h.pool.complete_drain(&channel);
    assert_eq!(h.pool.poll(&partition("https://a.example/")), Some(channel));
    assert_eq!(h.exchange.partition(), &partition("https://b.example/"));
}

#[tokio::test]
async fn test_multi_hop_redirect_offers_each_channel_to_its_origin() {
    let mut h = harness("https://a.example/", following());
    let on_a = Channel::new();
    let on_b = Channel::new();

    let to_b = redirect(StatusCode::FOUND, "https://b.example/");
    assert_eq!(
        h.protocol.handle(&on_a, &mut h.exchange, &to_b),
        ResponseDisposition::Redirected
    );
    assert!(matches!(h.dispatches.recv().await, Some(Dispatch::Send { .. })));

    let to_c = redirect(StatusCode::FOUND, "https://c.example/");
    assert_eq!(
        h.protocol.handle(&on_b, &mut h.exchange, &to_c),
        ResponseDisposition::Redirected
    );
    assert!(matches!(h.dispatches.recv().await, Some(Dispatch::Send { .. })));

    h.pool.complete_drain(&on_a);
    h.pool.complete_drain(&on_b);
    assert_eq!(h.pool.idle_channel_count(), 2);

    assert_eq!(h.pool.poll(&partition("https://a.example/")), Some(on_a));
    assert_eq!(h.pool.poll(&partition("https://a.example/")), None);
    assert_eq!(h.pool.poll(&partition("https://b.example/")), Some(on_b));
    assert_eq!(h.pool.poll(&partition("https://c.example/")), None);
    assert_eq!(h.exchange.partition(), &partition("https://c.example/"));
}

#[tokio::test]
async fn test_replay_to_other_origin_offers_under_previous_origin() {
    let config = ClientConfig::builder()
        .response_filter(|ctx: FilterContext| -> Result<FilterContext, FilterError> {
            if ctx.response_status() != Some(StatusCode::SERVICE_UNAVAILABLE) {
                return Ok(ctx);
            }
            let mirror = Request::builder(Method::GET, "https://mirror.example/")
                .map_err(|e| FilterError::new(e.to_string()))?
                .build();
            Ok(ctx.with_request(mirror).replay())
        })
        .build();
    let mut h = harness("https://example.com/", config);
    let channel = Channel::new();

    let unavailable = HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, OrderedHeaderMap::new());
    assert_eq!(
        h.protocol.handle(&channel, &mut h.exchange, &unavailable),
        ResponseDisposition::Replayed
    );
    assert!(matches!(h.dispatches.recv().await, Some(Dispatch::Replay { .. })));

    h.pool.complete_drain(&channel);
    assert_eq!(h.pool.poll(&partition("https://mirror.example/")), None);
    assert_eq!(h.pool.poll(&partition("https://example.com/")), Some(channel));
    assert_eq!(h.exchange.partition(), &partition("https://mirror.example/"));
}

#[tokio::test]
async fn test_chunked_redirect_closes_channel() {
    let mut h = harness("https://example.com/a", following());
    let channel = Channel::new();

    let response = redirect(StatusCode::FOUND, "/b").with_chunked(true);
    assert_eq!(
        h.protocol.handle(&channel, &mut h.exchange, &response),
        ResponseDisposition::Redirected
    );
    assert!(!channel.is_open());
    assert_eq!(h.pool.pending_drain_count(), 0);
}

#[tokio::test]
async fn test_redirect_budget_aborts_exchange() {
    let config = ClientConfig::builder()
        .follow_redirect(true)
        .max_redirects(2)
        .build();
    let mut h = harness("https://example.com/0", config);

    for hop in 1..=2 {
        let channel = Channel::new();
        let response = redirect(StatusCode::FOUND, &format!("/{hop}"));
        assert_eq!(
            h.protocol.handle(&channel, &mut h.exchange, &response),
            ResponseDisposition::Redirected
        );
        assert!(matches!(h.dispatches.recv().await, Some(Dispatch::Send { .. })));
    }

    let channel = Channel::new();
    let disposition = h
        .protocol
        .handle(&channel, &mut h.exchange, &redirect(StatusCode::FOUND, "/3"));
    assert_eq!(disposition, ResponseDisposition::Aborted);
    assert!(!channel.is_open());
    assert!(h.exchange.is_done());

    let expected = NetError::MaxRedirectsExceeded { max: 2 };
    match h.dispatches.recv().await.unwrap() {
        Dispatch::Abort { exchange_id, error } => {
            assert_eq!(exchange_id, h.exchange.id());
            assert_eq!(error, expected);
        }
        other => panic!("unexpected dispatch: {other:?}"),
    }
    assert_eq!(*h.handler.errors.lock().unwrap(), vec![expected]);
}

#[tokio::test]
async fn test_redirect_not_followed_falls_through_to_filters() {
    let config = ClientConfig::builder()
        .response_filter(|ctx: FilterContext| -> Result<FilterContext, FilterError> {
            assert_eq!(ctx.response_status(), Some(StatusCode::FOUND));
            Ok(ctx)
        })
        .build();
    let mut h = harness("https://example.com/", config);

    let response = redirect(StatusCode::FOUND, "/elsewhere");
    let disposition = h.protocol.handle(&Channel::new(), &mut h.exchange, &response);
    assert_eq!(disposition, ResponseDisposition::Deliver);
    assert!(h.dispatches.try_recv().is_err());
}

#[tokio::test]
async fn test_filter_replay_dispatched() {
    let config = ClientConfig::builder()
        .response_filter(|ctx: FilterContext| -> Result<FilterContext, FilterError> {
            if ctx.response_status() != Some(StatusCode::UNAUTHORIZED) {
                return Ok(ctx);
            }
            let request = RequestBuilder::from_request(ctx.request())
                .header("Authorization", "Bearer fresh")
                .build();
            Ok(ctx.with_request(request).replay())
        })
        .build();
    let mut h = harness("https://example.com/private", config);
    let channel = Channel::new();

    let response = HttpResponse::new(StatusCode::UNAUTHORIZED, OrderedHeaderMap::new());
    assert_eq!(
        h.protocol.handle(&channel, &mut h.exchange, &response),
        ResponseDisposition::Replayed
    );

    match h.dispatches.recv().await.unwrap() {
        Dispatch::Replay { exchange_id, request } => {
            assert_eq!(exchange_id, h.exchange.id());
            assert!(request.headers().contains("authorization"));
        }
        other => panic!("unexpected dispatch: {other:?}"),
    }
    assert!(h.exchange.request().headers().contains("authorization"));
    assert!(h.pool.is_draining(&channel));
    assert!(h.dispatches.try_recv().is_err());
}

#[tokio::test]
async fn test_try_filters_reports_handled() {
    let config = ClientConfig::builder()
        .response_filter(|_: FilterContext| -> Result<FilterContext, FilterError> {
            Err(FilterError::new("denied"))
        })
        .build();
    let mut h = harness("https://example.com/", config);
    let channel = Channel::new();

    let handled = h
        .protocol
        .try_filters(&channel, &mut h.exchange, StatusCode::OK, &OrderedHeaderMap::new())
        .unwrap();
    assert!(handled);
    assert!(matches!(
        h.dispatches.recv().await,
        Some(Dispatch::Abort { error: NetError::Filter(_), .. })
    ));
    assert_eq!(h.handler.errors.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_websocket_upgrade() {
    let mut h = harness("wss://example.com/socket", ClientConfig::default());
    assert_eq!(h.protocol.kind(), ProtocolKind::WebSocket);

    let mut headers = OrderedHeaderMap::new();
    headers.insert("Upgrade", "websocket").unwrap();
    headers.insert("Connection", "Upgrade").unwrap();
    let response = HttpResponse::new(StatusCode::SWITCHING_PROTOCOLS, headers);

    assert_eq!(
        h.protocol.handle(&Channel::new(), &mut h.exchange, &response),
        ResponseDisposition::Upgrade
    );
    assert!(h.dispatches.try_recv().is_err());
}

#[tokio::test]
async fn test_websocket_rejected_handshake_aborts() {
    let mut h = harness("ws://example.com/socket", ClientConfig::default());
    let channel = Channel::new();

    assert_eq!(
        h.protocol.handle(&channel, &mut h.exchange, &ok()),
        ResponseDisposition::Aborted
    );
    assert!(!channel.is_open());
    assert!(matches!(
        h.dispatches.recv().await,
        Some(Dispatch::Abort { error: NetError::WsProtocolError, .. })
    ));
}

#[tokio::test]
async fn test_closed_dispatcher_surfaces_as_abort() {
    let mut h = harness("https://example.com/a", following());
    h.dispatches.close();

    let disposition = h
        .protocol
        .handle(&Channel::new(), &mut h.exchange, &redirect(StatusCode::FOUND, "/b"));
    assert_eq!(disposition, ResponseDisposition::Aborted);
    assert_eq!(*h.handler.errors.lock().unwrap(), vec![NetError::DispatcherClosed]);
}

#[test]
fn test_unsupported_scheme_rejected() {
    let pool = Arc::new(IdleChannelPool::new());
    let (sender, _rx) = QueuedRequestSender::new(pool.clone());
    let url = Url::parse("ftp://example.com/file").unwrap();

    let err = Protocol::for_url(&url, &ClientConfig::default(), pool, Arc::new(sender))
        .err()
        .unwrap();
    assert_eq!(err, NetError::DisallowedUrlScheme);
}
