//! WebSocket client with automatic reconnection

use super::backoff::Backoff;
use super::transport::{Connector, WsConnection, WsFrame};
use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Reusable WebSocket client with automatic reconnection and ping/pong handling
pub struct WsClient {
    config: WsConfig,
    connector: Arc<dyn Connector>,
}

impl WsClient {
    /// Create a client over the given transport
    pub fn with_connector(config: WsConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Connect and return a receiver for messages
    ///
    /// This spawns a background task that handles connection management,
    /// reconnection per the configured backoff, and ping/pong keepalive.
    /// Only one socket is open at a time: a new attempt starts only after
    /// the previous socket has been dropped.
    ///
    /// Dropping the receiver closes the socket and cancels any pending
    /// reconnect. The channel closes when the loop gives up.
    pub fn connect(&self) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(self.config.buffer_size.max(1));
        let config = self.config.clone();
        let connector = Arc::clone(&self.connector);

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, connector, tx).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        rx
    }

    /// Run the connection loop with automatic reconnection
    async fn run_connection_loop(
        config: WsConfig,
        connector: Arc<dyn Connector>,
        tx: mpsc::Sender<WsMessage>,
    ) -> Result<(), WsError> {
        let mut backoff = Backoff::new(config.backoff);

        loop {
            let err = match Self::connect_and_stream(&config, connector.as_ref(), &tx, &mut backoff)
                .await
            {
                Ok(()) => {
                    tracing::debug!("Receiver dropped, stopping connection loop");
                    return Ok(());
                }
                Err(e) => e,
            };

            let delay = backoff.next_delay();
            let failures = backoff.failures();
            tracing::warn!(
                error = %err,
                attempt = failures,
                delay_ms = delay.as_millis() as u64,
                "WebSocket connection lost"
            );

            if tx
                .send(WsMessage::Disconnected {
                    reason: err.to_string(),
                })
                .await
                .is_err()
            {
                return Ok(());
            }

            // Check max reconnects (0 = infinite)
            if config.max_reconnect_attempts > 0 && failures >= config.max_reconnect_attempts {
                tracing::error!("Max reconnection attempts reached");
                return Err(WsError::MaxReconnectsExceeded);
            }

            if tx
                .send(WsMessage::Reconnecting {
                    attempt: failures,
                    delay,
                })
                .await
                .is_err()
            {
                return Ok(());
            }

            tokio::select! {
                biased;
                _ = tx.closed() => {
                    tracing::debug!("Receiver dropped, cancelling reconnect");
                    return Ok(());
                }
                _ = sleep(delay) => {}
            }
        }
    }

    /// Connect to WebSocket and stream messages
    ///
    /// Returns `Ok(())` only when the receiver is gone; every socket loss is
    /// an error so the caller reconnects.
    async fn connect_and_stream(
        config: &WsConfig,
        connector: &dyn Connector,
        tx: &mpsc::Sender<WsMessage>,
        backoff: &mut Backoff,
    ) -> Result<(), WsError> {
        if tx.send(WsMessage::Connecting).await.is_err() {
            return Ok(());
        }

        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let WsConnection {
            mut sink,
            mut stream,
        } = tokio::select! {
            biased;
            _ = tx.closed() => return Ok(()),
            conn = connector.connect(&config.url) => conn?,
        };

        tracing::info!("WebSocket connected");
        backoff.reset();

        // Notify connected
        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(());
        }

        // First ping goes out one full interval after connecting
        let mut keepalive = config.ping_interval.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                biased;

                _ = tx.closed() => {
                    tracing::debug!("Receiver dropped, closing connection");
                    let _ = sink.send(WsFrame::Close).await;
                    return Ok(());
                }

                // Handle incoming messages
                frame = stream.next() => {
                    match frame {
                        Some(Ok(WsFrame::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                return Ok(());
                            }
                        }
                        Some(Ok(WsFrame::Binary(data))) => {
                            if tx.send(WsMessage::Binary(data)).await.is_err() {
                                return Ok(());
                            }
                        }
                        Some(Ok(WsFrame::Ping(data))) => {
                            sink.send(WsFrame::Pong(data)).await?;
                        }
                        Some(Ok(WsFrame::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(WsFrame::Close)) => {
                            tracing::info!("Received close frame");
                            return Err(WsError::Closed);
                        }
                        Some(Err(e)) => return Err(e),
                        None => return Err(WsError::StreamEnded),
                    }
                }

                // Send periodic pings
                _ = async {
                    match keepalive.as_mut() {
                        Some(ticker) => {
                            ticker.tick().await;
                        }
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    if waiting_for_pong {
                        return Err(WsError::PongTimeout);
                    }
                    sink.send(WsFrame::Ping(Vec::new())).await?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}
