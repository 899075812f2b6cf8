//! Adapter error types

use crate::router::RouteError;
use thiserror::Error;

/// Errors raised while turning an upstream payload into a content graph
///
/// None of these escape `get_page`; they become an error page instead.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Malformed upstream payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{id} was derived twice with different payloads")]
    DuplicateId { id: String },

    #[error("{id} is reachable from its own replies")]
    Cycle { id: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
