//! Configuration error type.

use leadflow_core::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The flow cannot drive a conversation; fatal, the widget stays hidden.
    #[error("invalid flow configuration: {0}")]
    InvalidFlow(#[from] FlowError),

    /// Two questions in one option share a label; the answer map could not
    /// disambiguate them.
    #[error("duplicate question label '{label}' in option '{option}'")]
    DuplicateLabel { option: String, label: String },

    /// A settings field failed validation.
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Settings file/env parsing failed.
    #[error("failed to load settings: {0}")]
    Source(#[from] config::ConfigError),
}
