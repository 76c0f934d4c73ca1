//! Widget initialization errors.

use thiserror::Error;

use crate::host::Capability;

#[derive(Debug, Error)]
pub enum InitError {
    /// The embedding page supplied no chatbot id. Checked before any
    /// network call.
    #[error("no chatbot id provided")]
    MissingChatbotId,

    /// The host page lacks capabilities the widget cannot run without.
    #[error("host page is missing required capabilities: {}", format_missing(missing))]
    MissingDependencies { missing: Vec<Capability> },

    /// Credential lookup against the tenant config endpoint failed.
    #[error("failed to resolve tenant credentials: {0}")]
    Credentials(#[from] leadflow_persistence::PersistenceError),

    /// No widget configuration row exists for this chatbot.
    #[error("no widget configuration found for chatbot")]
    MissingWidgetConfig,

    /// Data store access failed during initialization.
    #[error("store error during init: {0}")]
    Store(#[from] leadflow_core::StoreError),
}

fn format_missing(missing: &[Capability]) -> String {
    missing
        .iter()
        .map(Capability::name)
        .collect::<Vec<_>>()
        .join(", ")
}
