//! Errors at the crate boundary. The inference and layout engines themselves
//! are infallible.

use thiserror::Error;

use crate::family::ProposalError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("family service returned HTTP {status}")]
    Http { status: u16 },
    #[error("family service rejected the request: {message}")]
    Validation { message: String },
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Proposal(#[from] ProposalError),
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
    #[error("invalid input: {0}")]
    Input(#[source] serde_json::Error),
}

impl EngineError {
    /// Short category the front-end can switch on.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Service(ServiceError::Http { .. }) => "http",
            EngineError::Service(ServiceError::Validation { .. }) => "validation",
            EngineError::Service(ServiceError::Malformed(_)) => "malformed",
            EngineError::Proposal(_) => "proposal",
            EngineError::Config(_) => "config",
            EngineError::Input(_) => "input",
        }
    }
}
