// Tailview - core/mod.rs
//
// Core layer: the log buffer, severity/wire model, markup, and export.
// Must NOT depend on: ui, app, server, or any I/O beyond Write sinks.

pub mod buffer;
pub mod export;
pub mod markup;
pub mod model;
