//! One-shot configuration normalization.
//!
//! Executed once at widget load: validates the flow, rejects flows the
//! answer map cannot represent, downgrades malformed proactive settings to
//! a warning, and materializes the theme. The output is the only
//! configuration shape the engine and runtime ever see.

use std::collections::HashSet;
use std::time::Duration;

use leadflow_core::{FlowData, ProactiveMessages};

use crate::error::ConfigError;
use crate::theme::{Theme, ThemeUpdate};

/// Fully-populated runtime configuration.
#[derive(Debug, Clone)]
pub struct NormalizedConfig {
    pub flow: FlowData,
    pub theme: Theme,
    /// `None` when proactive messages are disabled or misconfigured.
    pub proactive: Option<ProactiveSettings>,
}

/// Validated proactive-message settings. Presence implies usability: all
/// durations are non-zero and the message list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProactiveSettings {
    pub messages: Vec<String>,
    pub delay: Duration,
    pub interval: Duration,
    pub max_messages: u32,
}

/// Normalize a persisted flow + sparse theme into a [`NormalizedConfig`].
pub fn normalize(flow: FlowData, theme: Option<&ThemeUpdate>) -> Result<NormalizedConfig, ConfigError> {
    flow.validate()?;
    reject_duplicate_labels(&flow)?;

    let proactive = flow.proactive_messages.as_ref().and_then(validate_proactive);
    let theme = theme.map(Theme::from_update).unwrap_or_default();

    Ok(NormalizedConfig {
        flow,
        theme,
        proactive,
    })
}

/// Question labels key the answer map, so they must be unique within one
/// option's flow.
fn reject_duplicate_labels(flow: &FlowData) -> Result<(), ConfigError> {
    for option in &flow.options {
        let mut seen = HashSet::new();
        for question in &option.flow {
            if !seen.insert(question.label.as_str()) {
                return Err(ConfigError::DuplicateLabel {
                    option: option.label.clone(),
                    label: question.label.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Malformed proactive settings are a warning, not a fatal error: the
/// scheduler simply stays idle.
fn validate_proactive(raw: &ProactiveMessages) -> Option<ProactiveSettings> {
    if !raw.enabled {
        return None;
    }
    if raw.messages.is_empty() || raw.delay == 0 || raw.interval == 0 || raw.max_messages == 0 {
        tracing::warn!(
            messages = raw.messages.len(),
            delay = raw.delay,
            interval = raw.interval,
            max_messages = raw.max_messages,
            "invalid proactive messages configuration, scheduler disabled"
        );
        return None;
    }
    Some(ProactiveSettings {
        messages: raw.messages.clone(),
        delay: Duration::from_secs(raw.delay),
        interval: Duration::from_secs(raw.interval),
        max_messages: raw.max_messages,
    })
}
