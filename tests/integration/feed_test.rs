//! Integration tests for the shared price feed

use halving_sentinel::feed::{ConnectionState, PriceFeedConnection};
use halving_sentinel::ws::{BackoffPolicy, ScriptedConnector, WsConfig};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_pending;

fn feed(connector: &ScriptedConnector) -> PriceFeedConnection {
    let config = WsConfig::new("wss://feed.test/ws/btcusdt@ticker")
        .backoff(BackoffPolicy::Fixed(Duration::from_millis(3000)))
        .without_ping();
    PriceFeedConnection::with_connector(config, Arc::new(connector.clone()))
}

#[tokio::test]
async fn test_channel_subscription_receives_ticks() {
    let connector = ScriptedConnector::new();
    let session = connector.push_session();
    let feed = feed(&connector);

    let (handle, mut rx) = feed.subscribe(16);
    connector.wait_for_attempts(1).await;
    assert_eq!(connector.urls(), vec!["wss://feed.test/ws/btcusdt@ticker"]);

    {
        let mut recv = tokio_test::task::spawn(rx.recv());
        assert_pending!(recv.poll());
    }

    session.send_text(r#"{"e":"24hrTicker","s":"BTCUSDT","c":"64000.50","P":"-1.25","q":"1234567.8"}"#);
    let tick = rx.recv().await.unwrap();
    assert_eq!(tick.symbol, "BTCUSDT");
    assert_eq!(tick.last_price, dec!(64000.50));
    assert_eq!(tick.percent_change_24h, dec!(-1.25));
    assert_eq!(tick.quote_volume_24h, dec!(1234567.8));

    handle.close();
    // Closing releases the callback and with it the channel sender
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_malformed_payloads_are_skipped() {
    let connector = ScriptedConnector::new();
    let session = connector.push_session();
    let feed = feed(&connector);

    let (_handle, mut rx) = feed.subscribe(16);
    connector.wait_for_attempts(1).await;

    session.send_text("not json");
    session.send_text(r#"{"c":"abc"}"#);
    session.send_text(r#"{"c":"-5"}"#);
    session.send_text(r#"{"e":"trade","c":"1"}"#);
    session.send_text(r#"{"c":"42"}"#);

    let tick = rx.recv().await.unwrap();
    assert_eq!(tick.last_price, dec!(42));
    assert_eq!(connector.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_after_fixed_delay() {
    let connector = ScriptedConnector::new();
    let first = connector.push_session();
    let second = connector.push_session();
    let feed = feed(&connector);

    let (_handle, mut rx) = feed.subscribe(16);
    let mut state = feed.watch_state();
    state
        .wait_for(|s| *s == ConnectionState::Connected)
        .await
        .unwrap();
    assert!(feed.is_live());

    drop(first);
    state
        .wait_for(|s| *s == ConnectionState::Disconnected)
        .await
        .unwrap();
    assert!(!feed.is_live());

    connector.wait_for_attempts(2).await;
    let times = connector.attempt_times();
    assert!(times[1] - times[0] >= Duration::from_millis(3000));

    state
        .wait_for(|s| *s == ConnectionState::Connected)
        .await
        .unwrap();
    second.send_text(r#"{"c":"101"}"#);
    assert_eq!(rx.recv().await.unwrap().last_price, dec!(101));
}

#[tokio::test]
async fn test_last_close_releases_socket() {
    let connector = ScriptedConnector::new();
    let session = connector.push_session();
    let feed = feed(&connector);

    let (a, _rx_a) = feed.subscribe(4);
    let (b, mut rx_b) = feed.subscribe(4);
    connector.wait_for_attempts(1).await;
    assert_eq!(feed.subscriber_count(), 2);

    feed.close(&a);
    session.send_text(r#"{"c":"7"}"#);
    assert_eq!(rx_b.recv().await.unwrap().last_price, dec!(7));
    assert!(!session.is_closed());

    drop(b);
    assert_eq!(feed.subscriber_count(), 0);
    tokio::time::timeout(Duration::from_secs(1), async {
        while !session.is_closed() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    let mut idle = tokio_test::task::spawn(connector.wait_for_attempts(2));
    assert_pending!(idle.poll());
    drop(idle);

    // A fresh subscriber opens a new socket
    let _next = connector.push_session();
    let (_c, _rx_c) = feed.subscribe(4);
    tokio::time::timeout(Duration::from_secs(1), connector.wait_for_attempts(2))
        .await
        .unwrap();
}
