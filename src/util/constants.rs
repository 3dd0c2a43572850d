// Tailview - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "Tailview";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log buffer
// =============================================================================

/// Default number of rendered lines kept in the log buffer. 0 = unbounded.
pub const DEFAULT_HISTORY_LINES: usize = 2_000;

/// Hard upper bound on the user-configurable history capacity.
pub const MAX_HISTORY_LINES: usize = 100_000;

/// Distance from the bottom of the log view, in pixels, within which the
/// view is considered "at the bottom" and auto-scroll stays engaged.
pub const SCROLL_STICKY_THRESHOLD_PX: f32 = 50.0;

// =============================================================================
// Tailing
// =============================================================================

/// Default number of trailing lines requested when a file is selected.
pub const DEFAULT_TAIL_LINES: u64 = 10;

/// Maximum user-configurable trailing line count.
pub const MAX_TAIL_LINES: u64 = 100_000;

// =============================================================================
// Connection
// =============================================================================

/// Delay before a dropped backend connection is retried (ms).
pub const RECONNECT_DELAY_MS: u64 = 1_000;

/// Maximum number of client events processed by the UI update loop per
/// frame. Remaining events stay queued and are drained on later frames so a
/// burst of stream output cannot stall the render loop.
pub const MAX_CLIENT_EVENTS_PER_FRAME: usize = 500;

/// Repaint interval while connected, so streamed lines appear promptly (ms).
pub const STREAM_REPAINT_INTERVAL_MS: u64 = 100;

// =============================================================================
// Server
// =============================================================================

/// Default listen address when neither config nor CLI provide one.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Websocket route, relative to the configured root.
pub const WS_ROUTE: &str = "ws";

/// Download route, relative to the configured root.
pub const DOWNLOAD_ROUTE: &str = "files";

/// Stream tag for child-process stdout frames.
pub const STREAM_TAG_STDOUT: &str = "o";

/// Stream tag for child-process stderr frames.
pub const STREAM_TAG_STDERR: &str = "e";

/// Group key the server uses for filespecs without an explicit group.
pub const DEFAULT_GROUP_KEY: &str = "__default__";

/// Label the UI shows for the default group.
pub const DEFAULT_GROUP_LABEL: &str = "Ungrouped Files";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
