//! Polygon animation reducer
//!
//! This crate provides:
//! - Per-frame cached polygon state derived from an action log
//! - The reducer (union/difference per frame, thumbnail simplification)
//! - An action journal with geometric anchor snapshots for bounded undo
//! - The editor state machine and project file handling

pub mod action;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod journal;
pub mod project;
pub mod reducer;
pub mod retention;
pub mod state;

// Re-exports
pub use action::{Action, ContentAction};
pub use editor::Animator;
pub use error::AnimatorError;
pub use geometry::Ring;
pub use journal::ActionJournal;
pub use project::{Attribution, Project, ProjectConfig};
pub use reducer::{apply_actions, apply_actions_to_state, ReducerConfig};
pub use retention::AnchorPolicy;
pub use state::{initial_state, CachedFrame, CachedState};

/// Result type for animator operations
pub type Result<T> = std::result::Result<T, AnimatorError>;
