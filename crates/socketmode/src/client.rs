//! Socket Mode client: session lifecycle, acknowledgment, reconnection and
//! the receive loop.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sb_domain::trace::TraceEvent;
use sb_protocol::{Event, Resolved};
use tokio_util::sync::CancellationToken;

use crate::opener::ConnectionOpener;
use crate::reconnect::ReconnectBackoff;
use crate::session::SocketSession;
use crate::types::{SessionError, SocketModeError};

/// A Socket Mode session bound to one app-level token.
///
/// Create via [`SocketModeClientBuilder`](crate::builder::SocketModeClientBuilder).
/// The client is driven by a single consumer: call
/// [`receive_message`](Self::receive_message) repeatedly, or hand control
/// to [`run`](Self::run).
pub struct SocketModeClient {
    pub(crate) app_token: String,
    pub(crate) timeout: Duration,
    pub(crate) debug: bool,
    pub(crate) reconnect_backoff: ReconnectBackoff,
    pub(crate) opener: Arc<dyn ConnectionOpener>,
    pub(crate) session: SocketSession,
}

/// What the dispatcher does after an envelope has been acknowledged.
enum Step {
    Deliver(Event),
    Reconnect(String),
    Continue,
}

impl SocketModeClient {
    /// Start a new builder.
    pub fn builder() -> crate::builder::SocketModeClientBuilder {
        crate::builder::SocketModeClientBuilder::new()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Run the handshake and dial the returned URL, replacing any live socket.
    pub async fn connect(&self) -> Result<(), SocketModeError> {
        let started = Instant::now();
        let url = self.opener.open(&self.app_token).await?;
        self.session.dial(&url).await?;

        TraceEvent::SocketOpened {
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();
        tracing::info!("socket mode session established");
        Ok(())
    }

    /// Close the socket.  Fails with [`SocketModeError::NotConnected`] when
    /// there is nothing to close.
    pub async fn close(&self) -> Result<(), SocketModeError> {
        match self.session.close().await {
            Ok(()) => Ok(()),
            Err(SessionError::NotConnected) => Err(SocketModeError::NotConnected),
            Err(e) => Err(SocketModeError::Session(e)),
        }
    }

    /// Wait for one inbound frame and process it.
    ///
    /// The frame is acknowledged before its payload is interpreted.  If it
    /// resolves to an [`Event`], `handler` is awaited with it.  A broken or
    /// malformed frame, a failed acknowledgment, or a `disconnect` envelope
    /// each cause a single reconnect within this call; the call then
    /// returns `Ok(())` with no event.
    ///
    /// Cancellation is checked before the socket: a token that is already
    /// cancelled returns [`SocketModeError::Cancelled`] without touching
    /// the socket.  No frame is consumed by a cancelled read.
    pub async fn receive_message<F, Fut>(
        &self,
        cancel: &CancellationToken,
        handler: F,
    ) -> Result<(), SocketModeError>
    where
        F: FnOnce(Event) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SocketModeError::Cancelled),
            frame = self.session.receive() => frame,
        };

        let step = match frame {
            Ok(text) => self.open_envelope(&text).await,
            Err(SessionError::NotConnected) => return Err(SocketModeError::NotConnected),
            Err(e) => Err(SocketModeError::Session(e)),
        };

        match step {
            Ok(Step::Deliver(event)) => handler(event).await.map_err(SocketModeError::Handler),
            Ok(Step::Reconnect(reason)) => self.reconnect(&reason).await,
            Ok(Step::Continue) => Ok(()),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "reconnecting");
                self.reconnect(&e.to_string()).await
            }
            Err(e) => Err(e),
        }
    }

    /// Decode, acknowledge and narrow one text frame.
    async fn open_envelope(&self, text: &str) -> Result<Step, SocketModeError> {
        let envelope = sb_protocol::decode(text)?;

        if self.debug {
            let pretty = serde_json::from_str::<serde_json::Value>(text)
                .and_then(|v| serde_json::to_string_pretty(&v))
                .unwrap_or_else(|_| text.to_owned());
            tracing::info!(envelope = %pretty, "inbound envelope");
        }

        if let Some(ack) = envelope.acknowledgment() {
            self.session
                .send(&ack)
                .await
                .map_err(SocketModeError::Acknowledgment)?;
            TraceEvent::EnvelopeAcknowledged {
                envelope_id: ack.envelope_id,
                envelope_type: envelope.envelope_type.clone(),
                retry_attempt: envelope.retry_attempt,
            }
            .emit();
        }

        Ok(match envelope.narrow()? {
            Resolved::Event(event) => Step::Deliver(event),
            Resolved::Disconnect { reason } => {
                tracing::info!(reason = %reason, "disconnect requested by server");
                Step::Reconnect(format!("disconnect: {reason}"))
            }
            Resolved::Hello => {
                tracing::info!("hello received, session is live");
                Step::Continue
            }
            Resolved::Skip(kind) => {
                tracing::debug!(envelope_type = %kind, "skipping unhandled envelope");
                Step::Continue
            }
        })
    }

    /// Tear down the current socket and establish a fresh one.  One attempt.
    async fn reconnect(&self, reason: &str) -> Result<(), SocketModeError> {
        let started = Instant::now();
        if let Err(e) = self.session.close().await {
            tracing::debug!(error = %e, "ignoring close error before reconnect");
        }
        self.connect().await?;

        TraceEvent::Reconnected {
            reason: reason.to_owned(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();
        Ok(())
    }

    /// Drive [`receive_message`](Self::receive_message) until `cancel` fires.
    ///
    /// Handler errors are logged and the loop continues.  When re-establishing
    /// the session fails, the loop waits according to the
    /// [`ReconnectBackoff`] policy and tries again; exhausting
    /// `max_attempts` returns [`SocketModeError::ReconnectExhausted`].
    pub async fn run<F, Fut>(&self, cancel: CancellationToken, handler: F) -> Result<(), SocketModeError>
    where
        F: Fn(Event) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        loop {
            match self.receive_message(&cancel, &handler).await {
                Ok(()) => {}
                Err(SocketModeError::Cancelled) => {
                    tracing::info!("shutdown requested");
                    return Ok(());
                }
                Err(SocketModeError::Handler(e)) => {
                    tracing::warn!(error = %e, "event handler failed");
                }
                Err(e @ (SocketModeError::Connection(_) | SocketModeError::NotConnected)) => {
                    tracing::warn!(error = %e, "connection lost");
                    match self.recover(&cancel).await {
                        Err(SocketModeError::Cancelled) => return Ok(()),
                        other => other?,
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Re-establish the session with back-off until it succeeds, the policy
    /// gives up, or `cancel` fires.
    async fn recover(&self, cancel: &CancellationToken) -> Result<(), SocketModeError> {
        let mut attempt: u32 = 0;
        loop {
            if self.reconnect_backoff.should_give_up(attempt) {
                tracing::error!(attempts = attempt, "max reconnect attempts exhausted");
                return Err(SocketModeError::ReconnectExhausted(attempt));
            }

            let delay = self.reconnect_backoff.delay_for_attempt(attempt);
            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                attempt = attempt + 1,
                "reconnecting"
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(SocketModeError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }

            match self.reconnect("recovery").await {
                Ok(()) => return Ok(()),
                Err(e) => tracing::warn!(attempt = attempt + 1, error = %e, "reconnect failed"),
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::{SinkExt, StreamExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::WebSocketStream;

    use super::*;
    use crate::types::ConnectError;

    struct FixedOpener {
        url: String,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ConnectionOpener for FixedOpener {
        async fn open(&self, _app_token: &str) -> Result<String, ConnectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.url.clone())
        }
    }

    async fn listen() -> (String, mpsc::Receiver<WebSocketStream<TcpStream>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/link", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                    let _ = tx.send(ws).await;
                }
            }
        });
        (url, rx)
    }

    async fn next_conn(
        rx: &mut mpsc::Receiver<WebSocketStream<TcpStream>>,
    ) -> WebSocketStream<TcpStream> {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn failed_ack_drops_frame_and_reconnects_once() {
        let (url, mut conns) = listen().await;
        let opener = Arc::new(FixedOpener {
            url,
            calls: AtomicUsize::new(0),
        });
        let client = SocketModeClient::builder()
            .app_token("xapp-test")
            .timeout(Duration::from_secs(2))
            .opener(opener.clone())
            .connect()
            .await
            .unwrap();
        let mut first = next_conn(&mut conns).await;

        let frame = r#"{"type":"events_api","envelope_id":"E1","payload":{"event":{"type":"message","channel":"C1","user":"U1","text":"lost"}}}"#;
        first.send(Message::Text(frame.into())).await.unwrap();
        client.session.close_write_half().await.unwrap();

        let delivered = AtomicUsize::new(0);
        let handled = &delivered;
        client
            .receive_message(&CancellationToken::new(), move |_event| async move {
                handled.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(handled.load(Ordering::SeqCst), 0);
        assert_eq!(opener.calls.load(Ordering::SeqCst), 2);
        assert!(client.is_connected());

        // The replacement socket acknowledges and delivers.
        let mut second = next_conn(&mut conns).await;
        let frame = frame.replace("E1", "E2").replace("lost", "kept");
        second.send(Message::Text(frame)).await.unwrap();
        client
            .receive_message(&CancellationToken::new(), move |event| async move {
                assert_eq!(event.text, "kept");
                handled.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(handled.load(Ordering::SeqCst), 1);
        match second.next().await {
            Some(Ok(Message::Text(ack))) => assert_eq!(ack, r#"{"envelope_id":"E2"}"#),
            other => panic!("expected ack, got {other:?}"),
        }
    }
}
