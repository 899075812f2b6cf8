//! Hacker News source adapter
//!
//! This crate provides:
//! - Path routing with bounded redirect following
//! - Algolia wire types
//! - The identity pass (deterministic ids, one link per upstream item)
//! - The materialize pass (memoized, cycle-checked post construction)
//! - `HackerNewsClient`, implementing `content::Client` with loader resolution

pub mod client;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod materialize;
pub mod router;
pub mod wire;

// Re-exports
pub use client::{HackerNewsClient, HackerNewsConfig, CLIENT_ID};
pub use error::AdapterError;
pub use fetch::{Fetch, HttpFetcher};
pub use identity::{item_id, IdentityMap, PAGE_HEADER};
pub use materialize::{LoadRequest, Materializer};
pub use router::{Listing, Route, RouteError, Router, MAX_REDIRECTS};

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;
