//! In-memory transport driven by test code
//!
//! Each queued [`ScriptedSession`] backs exactly one successful `connect`.
//! When the queue is empty, `connect` fails, which exercises the reconnect
//! path without a network.

use super::transport::{Connector, WsConnection, WsFrame};
use super::types::WsError;
use async_trait::async_trait;
use futures_util::{sink, stream};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

type Inbound = Result<WsFrame, WsError>;

struct PendingSession {
    inbound: mpsc::UnboundedReceiver<Inbound>,
    outbound: mpsc::UnboundedSender<WsFrame>,
}

#[derive(Default)]
struct ScriptState {
    pending: VecDeque<PendingSession>,
    attempts: Vec<Instant>,
    urls: Vec<String>,
}

/// Connector whose sockets are scripted sessions
#[derive(Clone)]
pub struct ScriptedConnector {
    state: Arc<Mutex<ScriptState>>,
    attempts_tx: Arc<watch::Sender<usize>>,
}

impl Default for ScriptedConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedConnector {
    pub fn new() -> Self {
        let (attempts_tx, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(ScriptState::default())),
            attempts_tx: Arc::new(attempts_tx),
        }
    }

    /// Queue a session for the next successful connect
    pub fn push_session(&self) -> ScriptedSession {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.state.lock().pending.push_back(PendingSession {
            inbound: inbound_rx,
            outbound: outbound_tx,
        });
        ScriptedSession {
            inbound: inbound_tx,
            outbound: outbound_rx,
        }
    }

    /// Number of connect calls so far, successful or not
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts.len()
    }

    /// Instants at which connect was called
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.state.lock().attempts.clone()
    }

    /// URLs passed to connect, in call order
    pub fn urls(&self) -> Vec<String> {
        self.state.lock().urls.clone()
    }

    /// Wait until at least `n` connect calls have happened
    pub async fn wait_for_attempts(&self, n: usize) {
        let mut rx = self.attempts_tx.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|count| *count >= n).await;
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<WsConnection, WsError> {
        let session = {
            let mut state = self.state.lock();
            state.attempts.push(Instant::now());
            state.urls.push(url.to_string());
            state.pending.pop_front()
        };
        self.attempts_tx.send_modify(|count| *count += 1);

        let Some(session) = session else {
            return Err(WsError::ConnectionFailed("no scripted session".into()));
        };

        let stream = stream::unfold(session.inbound, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        let sink = sink::unfold(session.outbound, |tx, frame: WsFrame| async move {
            // The test may have dropped its session; outbound frames are then discarded
            let _ = tx.send(frame);
            Ok::<_, WsError>(tx)
        });

        Ok(WsConnection {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}

/// Server side of one scripted socket
///
/// Dropping the session ends the client's stream, which the client sees as
/// an abnormal disconnect.
pub struct ScriptedSession {
    inbound: mpsc::UnboundedSender<Inbound>,
    outbound: mpsc::UnboundedReceiver<WsFrame>,
}

impl ScriptedSession {
    /// Deliver a text frame; false once the client has dropped the socket
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send_frame(WsFrame::Text(text.into()))
    }

    pub fn send_frame(&self, frame: WsFrame) -> bool {
        self.inbound.send(Ok(frame)).is_ok()
    }

    /// Inject a transport error into the client's stream
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.inbound
            .send(Err(WsError::ConnectionFailed(reason.into())))
            .is_ok()
    }

    /// Whether the client has released its end of the socket
    pub fn is_closed(&self) -> bool {
        self.inbound.is_closed()
    }

    /// Next frame written by the client
    pub async fn next_sent(&mut self) -> Option<WsFrame> {
        self.outbound.recv().await
    }
}
