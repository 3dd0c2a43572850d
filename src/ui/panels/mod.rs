// Tailview - ui/panels/mod.rs

pub mod logview;
pub mod toolbar;
