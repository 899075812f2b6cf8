//! CLI command implementations

pub mod config;
pub mod page;
pub mod replay;
