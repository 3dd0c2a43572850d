// Tailview - server/ws.rs
//
// Per-session websocket loop. A session receives the literal "list" to
// request a listing refresh, or a JSON tail request to (re)start a
// pipeline; it sends listing maps and `[tag, line]` stream frames.

use crate::core::model::TailRequest;
use crate::server::listing::build_listing;
use crate::server::stream::Pipeline;
use crate::server::ServerState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

async fn handle_session(socket: WebSocket, state: ServerState) {
    let (mut sink, mut stream) = socket.split();
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();
    let mut pipeline: Option<Pipeline> = None;

    tracing::debug!("Session opened");

    loop {
        tokio::select! {
            frame = frame_rx.recv() => {
                // The sender side is held here and by pipeline readers, so
                // recv() only returns None once both are gone.
                let Some(frame) = frame else { break };
                if sink.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(&text, &state, &frame_tx, &mut pipeline).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ping/pong/binary: nothing to do.
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Session receive error");
                        break;
                    }
                }
            }
        }
    }

    if let Some(pipeline) = pipeline.take() {
        pipeline.shutdown().await;
    }
    tracing::debug!("Session closed");
}

async fn handle_client_message(
    text: &str,
    state: &ServerState,
    frame_tx: &mpsc::UnboundedSender<String>,
    pipeline: &mut Option<Pipeline>,
) {
    if text == "list" {
        let snapshot = build_listing(&state.config.file_specs);
        let payload = match serde_json::to_string(&snapshot.groups) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode listing");
                return;
            }
        };
        *state.listing.write().await = snapshot;
        let _ = frame_tx.send(payload);
        return;
    }

    if text.starts_with('{') {
        let request: TailRequest = match serde_json::from_str(text) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed tail request");
                return;
            }
        };

        if !state.listing.read().await.is_allowed(&request.entry.path) {
            tracing::warn!(path = %request.entry.path, "Unknown file in tail request");
            return;
        }

        if let Some(previous) = pipeline.take() {
            previous.shutdown().await;
        }

        match Pipeline::spawn(&state.config, &request, frame_tx.clone()) {
            Ok(spawned) => *pipeline = Some(spawned),
            Err(e) => tracing::error!(error = %e, "Failed to start pipeline"),
        }
        return;
    }

    tracing::warn!(message = %text, "Unrecognised client message");
}
