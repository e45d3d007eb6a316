//! WebSocket client library
//!
//! Provides a reusable WebSocket client with automatic reconnection,
//! ping/pong handling, configurable backoff, and a pluggable transport.

mod backoff;
mod client;
#[cfg(any(test, feature = "test-util"))]
mod scripted;
mod transport;
mod types;

pub use backoff::{Backoff, BackoffPolicy, DEFAULT_RECONNECT_DELAY};
pub use client::WsClient;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::{ScriptedConnector, ScriptedSession};
pub use transport::{Connector, FrameSink, FrameStream, TungsteniteConnector, WsConnection, WsFrame};
pub use types::{WsConfig, WsError, WsMessage};
