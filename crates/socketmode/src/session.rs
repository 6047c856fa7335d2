//! The live WebSocket handle.
//!
//! [`SocketSession`] owns at most one connection.  Replacing it (dial,
//! reconnect) happens under a single write lock; the split sink and stream
//! halves sit behind their own async mutexes so an acknowledgment can be
//! written while nothing else is reading.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::types::{ConnectError, SessionError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Connection {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

/// Wraps a single bidirectional framed connection.
pub struct SocketSession {
    current: RwLock<Option<Arc<Connection>>>,
    dial_timeout: Duration,
}

impl SocketSession {
    /// A session with no socket yet; call [`dial`](Self::dial) to connect.
    pub fn new(dial_timeout: Duration) -> Self {
        Self {
            current: RwLock::new(None),
            dial_timeout,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.current.read().is_some()
    }

    /// Establish a socket from a one-time URL and install it as the current
    /// handle.  On failure any existing handle is left untouched.
    pub async fn dial(&self, url: &str) -> Result<(), ConnectError> {
        let (ws, _response) = tokio::time::timeout(self.dial_timeout, connect_async(url))
            .await
            .map_err(|_| ConnectError::Dial(format!("timed out after {:?}", self.dial_timeout)))?
            .map_err(|e| ConnectError::Dial(e.to_string()))?;

        let (sink, stream) = ws.split();
        let conn = Arc::new(Connection {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        });

        let previous = self.current.write().replace(conn);
        if previous.is_some() {
            tracing::debug!("replaced previous socket handle");
        }
        Ok(())
    }

    fn connection(&self) -> Result<Arc<Connection>, SessionError> {
        self.current.read().clone().ok_or(SessionError::NotConnected)
    }

    /// Serialize `frame` as JSON and send it as one text frame.
    pub async fn send<T: Serialize>(&self, frame: &T) -> Result<(), SessionError> {
        let json = serde_json::to_string(frame)?;
        let conn = self.connection()?;
        let mut sink = conn.sink.lock().await;
        sink.send(Message::Text(json)).await?;
        Ok(())
    }

    /// Wait for the next text frame.
    ///
    /// Control and binary frames are skipped.  Cancel-safe: dropping the
    /// returned future never loses a frame.
    pub async fn receive(&self) -> Result<String, SessionError> {
        let conn = self.connection()?;
        let mut stream = conn.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("{} {}", f.code, f.reason))
                        .unwrap_or_else(|| "close frame".into());
                    return Err(SessionError::Closed(reason));
                }
                Some(Ok(other)) => {
                    tracing::trace!(kind = ?frame_kind(&other), "skipping non-text frame");
                }
                Some(Err(e)) => return Err(SessionError::WebSocket(e)),
                None => return Err(SessionError::Closed("stream ended".into())),
            }
        }
    }

    /// Send a close frame and release the handle.
    ///
    /// Closing a session that has no handle is an error.
    pub async fn close(&self) -> Result<(), SessionError> {
        let conn = self.current.write().take().ok_or(SessionError::NotConnected)?;
        let mut sink = conn.sink.lock().await;
        sink.close().await?;
        Ok(())
    }

    /// Send a close frame but keep the handle, so reads still see frames
    /// already in flight while every later send fails.
    #[cfg(test)]
    pub(crate) async fn close_write_half(&self) -> Result<(), SessionError> {
        let conn = self.connection()?;
        let mut sink = conn.sink.lock().await;
        sink.close().await?;
        Ok(())
    }
}

fn frame_kind(msg: &Message) -> &'static str {
    match msg {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}
