// Tailview - app/conn.rs
//
// Connection manager: keeps one long-lived websocket to the backend alive
// on a background thread and surfaces inbound traffic as events.
//
// Architecture:
//   - `ConnectionManager` lives on the UI thread; `run_connection` runs on
//     a background thread driving a current-thread tokio runtime.
//   - Inbound frames become `ClientEvent`s on an mpsc channel that the UI
//     polls each frame (same pattern as the panels polling managers).
//   - Outbound requests go through an unbounded tokio channel into the
//     session pump.
//   - On close or connect failure the loop sleeps a fixed delay and
//     retries; being a single loop, at most one reconnect is ever pending.

use crate::core::model::{decode_frame, FileGroup, InboundFrame, TailRequest};
use crate::util::constants::RECONNECT_DELAY_MS;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

// =============================================================================
// Events and requests
// =============================================================================

/// Events surfaced to the UI thread.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The socket opened; a listing request has already been sent.
    Connected,

    /// The socket dropped (or a connect attempt failed); a reconnect is
    /// scheduled.
    Disconnected,

    /// A file-list update arrived.
    FileList(Vec<FileGroup>),

    /// A line of pipeline stdout arrived.
    Line(String),

    /// An inbound frame could not be decoded. Recoverable: prior state is
    /// untouched and the stream continues.
    ProtocolError(String),
}

/// Outbound client messages.
#[derive(Debug, Clone)]
enum Outbound {
    /// Request a listing refresh (the literal "list").
    List,

    /// Request a new tail pipeline.
    Tail(TailRequest),
}

impl Outbound {
    fn encode(&self) -> Result<String, serde_json::Error> {
        match self {
            Outbound::List => Ok("list".to_string()),
            Outbound::Tail(request) => serde_json::to_string(request),
        }
    }
}

// =============================================================================
// ConnectionManager
// =============================================================================

/// Owns the background connection thread and the channels to and from it.
pub struct ConnectionManager {
    event_rx: mpsc::Receiver<ClientEvent>,
    outbound_tx: tokio::sync::mpsc::UnboundedSender<Outbound>,
    shutdown: Arc<AtomicBool>,
}

impl ConnectionManager {
    /// Start connecting to `url`. The thread keeps reconnecting until the
    /// manager is dropped.
    pub fn connect(url: String) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let (outbound_tx, outbound_rx) = tokio::sync::mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!(error = %e, "Cannot build connection runtime");
                    return;
                }
            };
            runtime.block_on(run_connection(url, outbound_rx, event_tx, flag));
        });

        Self {
            event_rx,
            outbound_tx,
            shutdown,
        }
    }

    /// Drain up to `max` queued events without blocking. Anything beyond
    /// the cap stays queued for the next frame, keeping a burst of stream
    /// output from starving the UI.
    pub fn poll_events(&self, max: usize) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while events.len() < max {
            match self.event_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(_) => break,
            }
        }
        events
    }

    /// Ask the backend for a fresh file listing.
    pub fn request_listing(&self) {
        let _ = self.outbound_tx.send(Outbound::List);
    }

    /// Send a tail request. The caller clears the log buffer first so the
    /// view only ever shows output of the current selection.
    pub fn request_tail(&self, request: TailRequest) {
        let _ = self.outbound_tx.send(Outbound::Tail(request));
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        // The loop observes the flag between attempts; dropping the
        // outbound sender also ends an active session pump.
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

// =============================================================================
// Background connection loop
// =============================================================================

async fn run_connection(
    url: String,
    mut outbound_rx: tokio::sync::mpsc::UnboundedReceiver<Outbound>,
    event_tx: mpsc::Sender<ClientEvent>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return;
        }

        tracing::info!(url = %url, "Connecting to backend");
        match connect_async(&url).await {
            Ok((socket, _)) => {
                tracing::info!("Connected to backend");
                if event_tx.send(ClientEvent::Connected).is_err() {
                    return;
                }
                pump_session(socket, &mut outbound_rx, &event_tx).await;
                tracing::info!("Disconnected from backend");
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Backend connect failed");
            }
        }

        if event_tx.send(ClientEvent::Disconnected).is_err() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(RECONNECT_DELAY_MS)).await;
    }
}

/// Drive one live session until the socket drops or the UI goes away.
async fn pump_session<S>(
    socket: tokio_tungstenite::WebSocketStream<S>,
    outbound_rx: &mut tokio::sync::mpsc::UnboundedReceiver<Outbound>,
    event_tx: &mpsc::Sender<ClientEvent>,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = socket.split();

    // First action on every (re)connect: refresh the file list.
    if sink.send(Message::Text("list".to_string())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(message) = outbound else { return };
                let text = match message.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(error = %e, "Cannot encode outbound message");
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let event = match decode_frame(&text) {
                            Ok(InboundFrame::Listing(groups)) => ClientEvent::FileList(groups),
                            Ok(InboundFrame::Stdout(line)) => ClientEvent::Line(line),
                            Ok(InboundFrame::Ignored { tag }) => {
                                tracing::debug!(tag, "Ignoring reserved stream tag");
                                continue;
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Bad inbound frame");
                                ClientEvent::ProtocolError(e.to_string())
                            }
                        };
                        if event_tx.send(event).is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(_)) => {} // Ping/pong/binary: nothing to do.
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Session receive error");
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ListEntry;

    #[test]
    fn listing_request_encodes_to_the_literal_list() {
        assert_eq!(Outbound::List.encode().unwrap(), "list");
    }

    #[test]
    fn tail_request_encodes_the_selection() {
        let outbound = Outbound::Tail(TailRequest {
            command: "tail".to_string(),
            script: None,
            entry: ListEntry {
                path: "/var/log/syslog".to_string(),
                alias: "syslog".to_string(),
                size: 1,
                mtime: None,
                exists: true,
            },
            nlines: 10,
        });
        let text = outbound.encode().unwrap();
        assert!(text.starts_with('{'));
        assert!(text.contains(r#""command":"tail""#));
        assert!(text.contains(r#""script":null"#));
    }
}
