//! Error types shared across the workspace.

use thiserror::Error;

/// Why a flow configuration cannot drive a conversation.
///
/// A flow is atomically usable or unusable: any one of these makes the
/// whole flow invalid and the widget falls back to a single fixed error
/// message instead of starting the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("welcome message is empty")]
    EmptyWelcomeMessage,
    #[error("end message is empty")]
    EmptyEndMessage,
    #[error("flow has no options")]
    NoOptions,
}

/// Failure reported by a backing store implementation.
///
/// The widget treats the data store as an opaque collaborator, so store
/// errors carry a message rather than a backend-specific payload.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage request failed: {0}")]
    Backend(String),
    #[error("record not found")]
    NotFound,
}
