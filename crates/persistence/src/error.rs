//! Persistence error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the backend, with the response body when
    /// one could be read.
    #[error("backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The tenant config endpoint rejected the chatbot id.
    #[error("tenant config rejected: {message}")]
    TenantRejected { message: String },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// Anon key contained bytes that cannot travel in a header.
    #[error("invalid api key")]
    InvalidKey,
}

impl From<PersistenceError> for leadflow_core::StoreError {
    fn from(err: PersistenceError) -> Self {
        leadflow_core::StoreError::Backend(err.to_string())
    }
}
