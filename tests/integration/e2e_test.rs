//! End-to-end integration tests

use clap::Parser;
use halving_sentinel::cli::{Cli, Commands};
use halving_sentinel::config::Config;
use halving_sentinel::feed::PriceFeedConnection;
use halving_sentinel::pipeline::DisplayPipeline;
use halving_sentinel::project::{Direction, Projection};
use halving_sentinel::ws::ScriptedConnector;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_config_example_loads() {
    let config = assert_ok!(Config::load("config.toml.example"));

    assert_eq!(
        config.feed.stream_url(),
        "wss://stream.binance.com:9443/ws/btcusdt@ticker"
    );
    assert_eq!(config.reconnect.delay_ms, 3000);
    assert_eq!(config.flash.reset_after(), Duration::from_millis(300));

    let names: Vec<_> = config.widgets.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["btc", "sentinel", "volume_m"]);
    assert_eq!(
        config.widgets[1].projection,
        Projection::scaled(dec!(45000), dec!(1.4285)).unwrap()
    );
}

#[test]
fn test_cli_defaults_config_path() {
    let cli = assert_ok!(Cli::try_parse_from(["halving-sentinel", "config"]));
    assert_eq!(cli.config, "config.toml");
    assert!(matches!(cli.command, Commands::Config));

    assert_err!(Cli::try_parse_from(["halving-sentinel", "backtest"]));
}

#[tokio::test(start_paused = true)]
async fn test_configured_widgets_share_one_socket() {
    let mut config = assert_ok!(Config::load("config.toml.example"));
    config.reconnect.ping_interval_secs = 0;

    let connector = ScriptedConnector::new();
    let session = connector.push_session();
    let feed = PriceFeedConnection::with_connector(config.ws_config(), Arc::new(connector.clone()));

    let pipelines: Vec<DisplayPipeline> = config
        .widgets
        .iter()
        .map(|w| DisplayPipeline::attach(&w.name, &feed, w.projection, config.flash.reset_after()))
        .collect();
    connector.wait_for_attempts(1).await;
    assert_eq!(feed.subscriber_count(), 3);

    let mut watchers: Vec<_> = pipelines.iter().map(|p| p.watch()).collect();

    session.send_text(r#"{"e":"24hrTicker","s":"BTCUSDT","c":"45000","P":"2.10","q":"3000000"}"#);
    for rx in watchers.iter_mut() {
        rx.changed().await.unwrap();
    }
    assert_eq!(pipelines[0].latest().unwrap().price, dec!(45000));
    assert_eq!(pipelines[1].latest().unwrap().price, dec!(1.4285));
    assert_eq!(pipelines[2].latest().unwrap().price, dec!(3));

    session.send_text(r#"{"e":"24hrTicker","s":"BTCUSDT","c":"90000","P":"4.20","q":"2000000"}"#);
    for rx in watchers.iter_mut() {
        rx.changed().await.unwrap();
    }
    assert_eq!(pipelines[0].latest().unwrap().direction, Direction::Up);
    assert_eq!(pipelines[1].latest().unwrap().price, dec!(2.857));
    assert_eq!(pipelines[1].latest().unwrap().direction, Direction::Up);
    // Volume fell while price rose
    assert_eq!(pipelines[2].latest().unwrap().direction, Direction::Down);

    tokio::time::sleep(Duration::from_millis(301)).await;
    for pipeline in &pipelines {
        assert_eq!(pipeline.flash(), Direction::Neutral);
    }

    assert_eq!(connector.attempts(), 1);
    for pipeline in &pipelines {
        pipeline.close();
    }
    assert_eq!(feed.subscriber_count(), 0);
}
