//! Generic content graph for the thread reader
//!
//! This crate provides:
//! - Typed links and the append-only link store (`Page2Content`)
//! - Vertical/horizontal loaders describing unresolved edges
//! - The closed post schema every source adapter targets
//! - The `Client` adapter contract and its optional capabilities
//! - Loader dispatch with in-flight dedup by request link
//! - A thread view that flattens a resolved graph for display

pub mod client;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod loader;
pub mod opaque;
pub mod page;
pub mod post;
pub mod richtext;
pub mod store;
pub mod view;

// Re-exports
pub use client::{Capability, Client};
pub use dispatch::{DispatchOutcome, LoaderDispatcher};
pub use error::ContentError;
pub use link::{Link, LinkKey};
pub use loader::{
    BaseLoader, HorizontalItem, HorizontalLoaded, HorizontalLoader, Loader, LoaderRequest,
    LoaderState, VerticalLoaded, VerticalLoader,
};
pub use opaque::Opaque;
pub use page::Page2;
pub use post::{Body, Post, PostContent, PostContentPost};
pub use store::{Page2Content, ReadLink};

/// Result type for content operations
pub type Result<T> = std::result::Result<T, ContentError>;
