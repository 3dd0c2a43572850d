// Tailview - util/mod.rs
//
// Utility modules: error types, named constants, logging setup, formatting.
// No dependencies on core, app, server, or ui layers.

pub mod constants;
pub mod error;
pub mod fmt;
pub mod logging;
