// Tailview - server/mod.rs
//
// The streaming server: an axum router exposing the websocket session
// route and the authorised download route, nested under the configured
// relative root.

pub mod listing;
pub mod stream;
pub mod ws;

use crate::config::ServerConfig;
use crate::server::listing::{build_listing, ListingSnapshot};
use crate::util::error::ServeError;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;

/// Shared server state: the configuration plus the most recent listing
/// snapshot, which carries the allowed-path set consulted by downloads
/// and tail requests.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub listing: Arc<RwLock<ListingSnapshot>>,
}

impl ServerState {
    /// Build state with an initial listing so downloads and tail requests
    /// are authorised before the first "list" refresh.
    pub fn new(config: Arc<ServerConfig>) -> Self {
        tracing::info!("Generate initial file listing");
        let listing = build_listing(&config.file_specs);
        Self {
            config,
            listing: Arc::new(RwLock::new(listing)),
        }
    }
}

/// Build the application router, nested under the configured root.
pub fn router(state: ServerState) -> Router {
    let root = state.config.relative_root.clone();

    let routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/files", get(download_handler))
        .route("/files/", get(download_handler))
        .with_state(state);

    let app = if root == "/" {
        routes
    } else {
        Router::new().nest(root.trim_end_matches('/'), routes)
    };

    app.layer(TraceLayer::new_for_http())
}

/// Bind a listen address.
pub async fn bind(addr: &str) -> Result<TcpListener, ServeError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Serve the router on an already-bound listener until the process exits.
pub async fn run(listener: TcpListener, state: ServerState) -> Result<(), ServeError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(
            addr = %addr,
            root = %state.config.relative_root,
            "Server start"
        );
    }
    axum::serve(listener, router(state))
        .await
        .map_err(|source| ServeError::Accept { source })
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    path: String,
}

/// Serve a listed file for download. 403 when downloads are disabled,
/// 404 for any path outside the allowed set.
async fn download_handler(
    Query(query): Query<DownloadQuery>,
    State(state): State<ServerState>,
) -> Response {
    if !state.config.allow_download {
        return (StatusCode::FORBIDDEN, "downloads forbidden by server").into_response();
    }

    if !state.listing.read().await.is_allowed(&query.path) {
        tracing::warn!(path = %query.path, "Attempt to access unknown file");
        return (StatusCode::NOT_FOUND, "unknown file").into_response();
    }

    let file = match tokio::fs::File::open(&query.path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %query.path, error = %e, "Cannot open file for download");
            return (StatusCode::NOT_FOUND, "unknown file").into_response();
        }
    };

    let filename = Path::new(&query.path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    (headers, Body::from_stream(ReaderStream::new(file))).into_response()
}
