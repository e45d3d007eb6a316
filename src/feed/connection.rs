//! Shared price feed connection with fan-out subscribers
//!
//! One [`PriceFeedConnection`] owns at most one socket to the upstream ticker
//! stream. Any number of widgets subscribe to it with [`open`]; the socket is
//! started by the first subscriber and torn down when the last [`FeedHandle`]
//! is closed or dropped.
//!
//! [`open`]: PriceFeedConnection::open

use super::binance::{parse_ticker, ParseError};
use super::types::{ConnectionState, Tick};
use crate::telemetry::{increment, set_gauge, CounterMetric, GaugeMetric};
use crate::ws::{Connector, TungsteniteConnector, WsClient, WsConfig, WsMessage};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

type TickCallback = Box<dyn FnMut(&Tick) + Send>;

struct Subscriber {
    callback: Mutex<Option<TickCallback>>,
}

impl Subscriber {
    /// A callback that panics is released; the connection task and the other
    /// subscribers carry on
    fn deliver(&self, id: u64, tick: &Tick) {
        let mut slot = self.callback.lock();
        let Some(callback) = slot.as_mut() else {
            return;
        };
        if panic::catch_unwind(AssertUnwindSafe(|| callback(tick))).is_err() {
            *slot = None;
            increment(CounterMetric::SubscriberPanics);
            tracing::error!(subscriber = id, "Price feed subscriber panicked, callback released");
        }
    }

    /// Blocks until an in-flight delivery to this subscriber has finished
    fn release(&self) {
        let callback = self.callback.lock().take();
        drop(callback);
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Bumped every time a connection task is spawned
    generation: u64,
    subscribers: Vec<(u64, Arc<Subscriber>)>,
    task: Option<JoinHandle<()>>,
}

impl Registry {
    fn is_current(&self, generation: u64) -> bool {
        self.task.is_some() && self.generation == generation
    }
}

struct Shared {
    config: WsConfig,
    connector: Arc<dyn Connector>,
    registry: Mutex<Registry>,
    state_tx: watch::Sender<ConnectionState>,
}

impl Shared {
    fn publish_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
        set_gauge(GaugeMetric::FeedLive, if state.is_live() { 1.0 } else { 0.0 });
    }

    /// Updates made by a torn-down task are ignored
    fn set_state(&self, generation: u64, state: ConnectionState) {
        let registry = self.registry.lock();
        if registry.is_current(generation) {
            self.publish_state(state);
        }
    }

    fn dispatch(&self, generation: u64, tick: &Tick) {
        let subscribers: Vec<(u64, Arc<Subscriber>)> = {
            let registry = self.registry.lock();
            if !registry.is_current(generation) {
                return;
            }
            registry
                .subscribers
                .iter()
                .map(|(id, subscriber)| (*id, Arc::clone(subscriber)))
                .collect()
        };

        for (id, subscriber) in subscribers {
            subscriber.deliver(id, tick);
        }
    }

    fn unsubscribe(&self, id: u64) {
        let mut registry = self.registry.lock();
        registry.subscribers.retain(|(sid, _)| *sid != id);

        if registry.subscribers.is_empty() {
            if let Some(task) = registry.task.take() {
                task.abort();
                self.publish_state(ConnectionState::Disconnected);
                tracing::info!("Last subscriber closed, price feed torn down");
            }
        }
    }

    /// Called when the connection loop gave up on its own
    fn finish(&self, generation: u64) {
        let mut registry = self.registry.lock();
        if registry.is_current(generation) {
            registry.task = None;
            self.publish_state(ConnectionState::Disconnected);
        }
    }
}

/// Shared, self-healing subscription to one upstream ticker stream
#[derive(Clone)]
pub struct PriceFeedConnection {
    shared: Arc<Shared>,
}

impl PriceFeedConnection {
    /// Create a feed over the network transport
    pub fn new(config: WsConfig) -> Self {
        Self::with_connector(config, Arc::new(TungsteniteConnector))
    }

    /// Create a feed over a custom transport
    pub fn with_connector(config: WsConfig, connector: Arc<dyn Connector>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                config,
                connector,
                registry: Mutex::new(Registry::default()),
                state_tx,
            }),
        }
    }

    /// Upstream URL
    pub fn url(&self) -> &str {
        &self.shared.config.url
    }

    /// Register a tick callback, connecting if this is the first subscriber
    ///
    /// Returns immediately; ticks are delivered asynchronously on the
    /// connection task, in transport order. The callback must not close its
    /// own handle. Must be called from within a Tokio runtime.
    pub fn open<F>(&self, on_tick: F) -> FeedHandle
    where
        F: FnMut(&Tick) + Send + 'static,
    {
        let subscriber = Arc::new(Subscriber {
            callback: Mutex::new(Some(Box::new(on_tick))),
        });

        let mut registry = self.shared.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, Arc::clone(&subscriber)));

        if registry.task.is_none() {
            registry.generation += 1;
            let generation = registry.generation;
            let ws_rx = WsClient::with_connector(
                self.shared.config.clone(),
                Arc::clone(&self.shared.connector),
            )
            .connect();
            let shared = Arc::clone(&self.shared);

            tracing::info!(url = %self.shared.config.url, "Opening shared price feed");
            registry.task = Some(tokio::spawn(run_dispatch_loop(shared, generation, ws_rx)));
        }

        tracing::debug!(
            subscriber = id,
            subscribers = registry.subscribers.len(),
            "Price feed subscriber added"
        );

        FeedHandle {
            id,
            subscriber,
            shared: Arc::clone(&self.shared),
            closed: AtomicBool::new(false),
        }
    }

    /// Close a subscription; same as [`FeedHandle::close`]
    pub fn close(&self, handle: &FeedHandle) {
        handle.close();
    }

    /// Channel-backed subscription
    ///
    /// Ticks that do not fit into the buffer are dropped rather than
    /// stalling the other subscribers.
    pub fn subscribe(&self, buffer: usize) -> (FeedHandle, mpsc::Receiver<Tick>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = self.open(move |tick| {
            if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(tick.clone()) {
                tracing::debug!("Tick receiver lagging, dropping tick");
            }
        });
        (handle, rx)
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.shared.state_tx.borrow()
    }

    /// Liveness flag: true while the socket is connected
    pub fn is_live(&self) -> bool {
        self.state().is_live()
    }

    /// Watch connection state changes
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Number of open subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.shared.registry.lock().subscribers.len()
    }
}

/// Teardown handle for one subscription
///
/// Closing is idempotent. Dropping the handle closes it.
pub struct FeedHandle {
    id: u64,
    subscriber: Arc<Subscriber>,
    shared: Arc<Shared>,
    closed: AtomicBool,
}

impl FeedHandle {
    /// Stop delivering ticks to this subscriber
    ///
    /// Waits for an in-flight callback to return; no callback runs after
    /// this returns. Closing the last handle closes the socket and cancels
    /// any pending reconnect.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.subscriber.release();
        self.shared.unsubscribe(self.id);
        tracing::debug!(subscriber = self.id, "Price feed subscriber closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for FeedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHandle")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Turn socket events into ticks and connection state
async fn run_dispatch_loop(
    shared: Arc<Shared>,
    generation: u64,
    mut ws_rx: mpsc::Receiver<WsMessage>,
) {
    while let Some(msg) = ws_rx.recv().await {
        match msg {
            WsMessage::Text(text) => match parse_ticker(&text) {
                Ok(tick) => {
                    increment(CounterMetric::TicksReceived);
                    shared.dispatch(generation, &tick);
                }
                Err(ParseError::UnexpectedEvent(event)) => {
                    tracing::debug!(event = %event, "Ignoring non-ticker event");
                }
                Err(e) => {
                    increment(CounterMetric::MalformedMessages);
                    tracing::warn!(error = %e, "Dropping malformed ticker message");
                }
            },
            WsMessage::Binary(_) => {
                // Ticker streams are text only
            }
            WsMessage::Connecting => {
                shared.set_state(generation, ConnectionState::Connecting);
            }
            WsMessage::Connected => {
                tracing::info!("Price feed connected");
                shared.set_state(generation, ConnectionState::Connected);
            }
            WsMessage::Disconnected { reason } => {
                tracing::warn!(reason = %reason, "Price feed disconnected");
                shared.set_state(generation, ConnectionState::Disconnected);
            }
            WsMessage::Reconnecting { attempt, delay } => {
                increment(CounterMetric::Reconnects);
                tracing::info!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Price feed reconnect scheduled"
                );
            }
        }
    }

    tracing::error!("Price feed connection loop ended");
    shared.finish(generation);
}
