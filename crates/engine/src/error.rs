//! Engine error types.

use thiserror::Error;

/// Per-answer validation failure. Recoverable: the conversation stays on
/// the same question and the user can retype.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("This field is required")]
    Required,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid phone number")]
    InvalidPhone,
}

/// Conversation state-machine errors.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Answer(#[from] AnswerError),

    /// Operation invoked in a phase that does not accept it.
    #[error("operation not valid in phase {phase}")]
    WrongPhase { phase: &'static str },

    #[error("unknown flow option '{0}'")]
    UnknownOption(String),

    /// Skip requested on a required question.
    #[error("cannot skip a required question")]
    SkipRequired,
}

/// Lead assembly errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// A required question has no recorded answer. The lead is not built.
    #[error("required question '{label}' was not answered")]
    MissingRequired { label: String },
}
