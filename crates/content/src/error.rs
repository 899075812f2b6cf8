//! Content error types

use crate::client::Capability;
use thiserror::Error;

/// Errors surfaced by adapters through the `Client` contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    #[error("{0:?} is not supported by this client")]
    Unsupported(Capability),

    #[error("Token was not issued by this client")]
    ForeignToken,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
