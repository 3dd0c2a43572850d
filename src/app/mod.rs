// Tailview - app/mod.rs

pub mod conn;
pub mod state;

pub use conn::{ClientEvent, ConnectionManager};
pub use state::SessionState;
