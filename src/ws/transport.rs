//! Socket transports behind the WebSocket client

use super::types::WsError;
use async_trait::async_trait;
use futures_util::{future, Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Transport-neutral WebSocket frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsFrame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

impl From<WsFrame> for Message {
    fn from(frame: WsFrame) -> Self {
        match frame {
            WsFrame::Text(text) => Message::Text(text),
            WsFrame::Binary(data) => Message::Binary(data),
            WsFrame::Ping(data) => Message::Ping(data),
            WsFrame::Pong(data) => Message::Pong(data),
            WsFrame::Close => Message::Close(None),
        }
    }
}

/// Outbound half of an open socket
pub type FrameSink = Pin<Box<dyn Sink<WsFrame, Error = WsError> + Send>>;

/// Inbound half of an open socket
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<WsFrame, WsError>> + Send>>;

/// One open socket, split into its two halves
pub struct WsConnection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

/// Opens sockets for the client
///
/// Each call yields a fresh, independent connection. Dropping both halves
/// of a [`WsConnection`] closes the socket.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<WsConnection, WsError>;
}

/// Network transport backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<WsConnection, WsError> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (write, read) = ws_stream.split();

        let sink = write
            .with(|frame: WsFrame| future::ready(Ok(Message::from(frame))))
            .sink_map_err(|e: tokio_tungstenite::tungstenite::Error| {
                WsError::SendFailed(e.to_string())
            });

        let stream = read.filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(WsFrame::Text(text))),
                Ok(Message::Binary(data)) => Some(Ok(WsFrame::Binary(data))),
                Ok(Message::Ping(data)) => Some(Ok(WsFrame::Ping(data))),
                Ok(Message::Pong(data)) => Some(Ok(WsFrame::Pong(data))),
                Ok(Message::Close(_)) => Some(Ok(WsFrame::Close)),
                // Raw frames are never yielded when reading
                Ok(Message::Frame(_)) => None,
                Err(e) => Some(Err(WsError::ConnectionFailed(e.to_string()))),
            })
        });

        Ok(WsConnection {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}
