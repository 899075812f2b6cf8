//! Terminal front-end for the thread reader
//!
//! This crate provides:
//! - The TOML settings file shared by every subcommand
//! - Plain-text rendering of flattened thread rows
//! - Small formatting helpers (relative times, HTML bodies)

pub mod render;
pub mod settings;
pub mod util;

// Re-exports
pub use settings::Settings;
