//! Prometheus metrics

use std::net::SocketAddr;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Ticks parsed and fanned out
    TicksReceived,
    /// Payloads dropped as malformed
    MalformedMessages,
    /// Reconnects scheduled after a lost socket
    Reconnects,
    /// Subscriber callbacks released after panicking
    SubscriberPanics,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// 1 while the feed socket is connected
    FeedLive,
}

impl CounterMetric {
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::TicksReceived => "sentinel_feed_ticks_total",
            CounterMetric::MalformedMessages => "sentinel_feed_malformed_messages_total",
            CounterMetric::Reconnects => "sentinel_feed_reconnects_total",
            CounterMetric::SubscriberPanics => "sentinel_feed_subscriber_panics_total",
        }
    }
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::FeedLive => "sentinel_feed_live",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}

/// Start the Prometheus exporter on `0.0.0.0:<port>`
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
