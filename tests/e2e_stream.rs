// Tailview - tests/e2e_stream.rs
//
// End-to-end tests for the serving side: a real listener, real websocket
// clients, real `tail` child processes on real temp files — no mocks.
// Download routing is exercised in-process through the router service.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tailview::config::{parse_file_spec, ServerConfig};
use tailview::server::{self, ServerState};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tower::util::ServiceExt;

type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

// =============================================================================
// Helpers
// =============================================================================

fn test_config(specs: &[String], allow_download: bool) -> Arc<ServerConfig> {
    let mut config = ServerConfig::built_in().expect("built-in config must parse");
    config.file_specs = specs.iter().map(|s| parse_file_spec(s)).collect();
    config.allow_download = allow_download;
    Arc::new(config)
}

/// Bind an ephemeral port, serve in the background, return the address.
async fn start_server(config: Arc<ServerConfig>) -> std::net::SocketAddr {
    let state = ServerState::new(config);
    let listener = server::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = server::run(listener, state).await;
    });
    addr
}

async fn ws_connect(addr: std::net::SocketAddr) -> WsClient {
    let (socket, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    socket
}

/// Next text frame, skipping pings, with a generous timeout.
async fn next_text(socket: &mut WsClient) -> String {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(10), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = frame {
            return text;
        }
    }
}

async fn next_stream_line(socket: &mut WsClient) -> String {
    let text = next_text(socket).await;
    let (tag, line): (String, String) = serde_json::from_str(&text).expect("stream frame");
    assert_eq!(tag, "o");
    line
}

// =============================================================================
// Websocket session E2E
// =============================================================================

#[tokio::test]
async fn e2e_list_returns_grouped_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "one\n").unwrap();

    let spec = format!("alias=app,group=Main,{}", log.display());
    let addr = start_server(test_config(&[spec], true)).await;
    let mut socket = ws_connect(addr).await;

    socket
        .send(Message::Text("list".to_string()))
        .await
        .unwrap();
    let listing: serde_json::Value = serde_json::from_str(&next_text(&mut socket).await).unwrap();

    let group = listing["Main"].as_array().expect("Main group");
    assert_eq!(group.len(), 1);
    assert_eq!(group[0]["alias"], "app");
    assert_eq!(group[0]["path"], log.display().to_string());
    assert_eq!(group[0]["exists"], true);
}

#[tokio::test]
async fn e2e_tail_streams_existing_and_appended_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "first\nsecond\n").unwrap();

    let addr = start_server(test_config(&[log.display().to_string()], true)).await;
    let mut socket = ws_connect(addr).await;

    let request = serde_json::json!({
        "command": "tail",
        "script": null,
        "entry": {
            "path": log.display().to_string(),
            "alias": "app.log",
            "size": 13,
            "mtime": null,
            "exists": true,
        },
        "nlines": 10,
    });
    socket
        .send(Message::Text(request.to_string()))
        .await
        .unwrap();

    assert_eq!(next_stream_line(&mut socket).await, "first");
    assert_eq!(next_stream_line(&mut socket).await, "second");

    // tail -F picks up lines appended after the pipeline started.
    {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().append(true).open(&log).unwrap();
        writeln!(file, "third .ERROR: boom").unwrap();
    }
    assert_eq!(next_stream_line(&mut socket).await, "third .ERROR: boom");
}

#[tokio::test]
async fn e2e_grep_filters_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "keep me\ndrop this\nkeep too\n").unwrap();

    let addr = start_server(test_config(&[log.display().to_string()], true)).await;
    let mut socket = ws_connect(addr).await;

    let request = serde_json::json!({
        "command": "grep",
        "script": "keep",
        "entry": {
            "path": log.display().to_string(),
            "alias": "app.log",
            "size": 0,
            "mtime": null,
            "exists": true,
        },
        "nlines": 10,
    });
    socket
        .send(Message::Text(request.to_string()))
        .await
        .unwrap();

    assert_eq!(next_stream_line(&mut socket).await, "keep me");
    assert_eq!(next_stream_line(&mut socket).await, "keep too");
}

#[tokio::test]
async fn e2e_unlisted_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "listed\n").unwrap();

    let addr = start_server(test_config(&[log.display().to_string()], true)).await;
    let mut socket = ws_connect(addr).await;

    // A request for a path outside the listing must produce no stream
    // output; the session keeps serving afterwards.
    let request = serde_json::json!({
        "command": "tail",
        "script": null,
        "entry": {
            "path": "/etc/passwd",
            "alias": "passwd",
            "size": 0,
            "mtime": null,
            "exists": true,
        },
        "nlines": 10,
    });
    socket
        .send(Message::Text(request.to_string()))
        .await
        .unwrap();
    socket
        .send(Message::Text("list".to_string()))
        .await
        .unwrap();

    // The first frame after the rejected request is the listing, not
    // file content.
    let text = next_text(&mut socket).await;
    let listing: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(listing.is_object());
    assert!(listing["__default__"].is_array());
}

// =============================================================================
// Download route E2E
// =============================================================================

#[tokio::test]
async fn e2e_download_serves_a_listed_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "hello\n").unwrap();

    let config = test_config(&[log.display().to_string()], true);
    let app = server::router(ServerState::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/files/?path={}", log.display()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"hello\n");
}

#[tokio::test]
async fn e2e_download_rejects_unlisted_paths() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "hello\n").unwrap();

    let config = test_config(&[log.display().to_string()], true);
    let app = server::router(ServerState::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/files/?path=/etc/passwd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn e2e_download_forbidden_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "hello\n").unwrap();

    let config = test_config(&[log.display().to_string()], false);
    let app = server::router(ServerState::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/files/?path={}", log.display()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn e2e_routes_nest_under_the_relative_root() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");
    std::fs::write(&log, "hello\n").unwrap();

    let mut config = ServerConfig::built_in().unwrap();
    config.file_specs = vec![parse_file_spec(&log.display().to_string())];
    config.relative_root = "/tailview/".to_string();
    let app = server::router(ServerState::new(Arc::new(config)));

    let nested = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/tailview/files/?path={}", log.display()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(nested.status(), StatusCode::OK);

    let bare = app
        .oneshot(
            Request::builder()
                .uri(format!("/files/?path={}", log.display()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(bare.status(), StatusCode::NOT_FOUND);
}
