// Tailview - lib.rs
//
// Library root. Layering, top to bottom:
//   ui     — egui panels, presentation only
//   app    — session state and the backend connection
//   server — axum websocket / download server and tail pipelines
//   config — TOML configuration and file specs
//   core   — buffer, severity model, wire frames, export
//   util   — constants, errors, logging, formatting

pub mod app;
pub mod config;
pub mod core;
pub mod server;
pub mod ui;
pub mod util;
