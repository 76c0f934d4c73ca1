//! Conversation flow model.
//!
//! A [`Flow`] is the declarative configuration for one tenant's
//! conversation: a welcome message, a set of selectable options, each
//! owning an ordered list of typed questions, an end message, and optional
//! proactive-message settings. The widget fetches it read-only at mount
//! time and never mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// One persisted flow row, scoped to a chatbot (tenant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub chatbot_id: String,
    pub data: FlowData,
    pub created_at: DateTime<Utc>,
}

/// The flow payload proper. Field names are camelCase on the wire to match
/// the widget-config rows the dashboard writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowData {
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub end_message: String,
    #[serde(default)]
    pub show_end_screen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proactive_messages: Option<ProactiveMessages>,
    #[serde(default)]
    pub options: Vec<FlowOption>,
}

impl FlowData {
    /// Validate the flow for use by the conversation engine.
    ///
    /// There is no partial validity: the first failing rule is returned and
    /// the caller must refuse to proceed.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.welcome_message.trim().is_empty() {
            return Err(FlowError::EmptyWelcomeMessage);
        }
        if self.end_message.trim().is_empty() {
            return Err(FlowError::EmptyEndMessage);
        }
        if self.options.is_empty() {
            return Err(FlowError::NoOptions);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Look up an option by its button label (how the user selects it).
    pub fn option_by_label(&self, label: &str) -> Option<&FlowOption> {
        self.options.iter().find(|opt| opt.label == label)
    }

    /// Look up an option by id.
    pub fn option_by_id(&self, id: &str) -> Option<&FlowOption> {
        self.options.iter().find(|opt| opt.id == id)
    }
}

/// One selectable conversation branch. Question order is insertion order
/// and defines the sequence the user is walked through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowOption {
    pub id: String,
    /// Button text, also stored in the answer map under the reserved key.
    pub label: String,
    /// Ordered question sequence for this branch.
    #[serde(default)]
    pub flow: Vec<Question>,
}

impl FlowOption {
    /// Questions that must be answered before a lead can be built.
    pub fn required_questions(&self) -> impl Iterator<Item = &Question> {
        self.flow.iter().filter(|q| q.required)
    }
}

/// One collected input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// Determines the validation rule applied at answer time.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Prompt text shown to the user; also the key in the answer map.
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Choices for `option`-typed questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Scheduling settings, passed through to the external calendar
    /// integration untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Email,
    Phone,
    Name,
    Option,
    Calendar,
}

impl QuestionType {
    /// Whether an answer of this type can supply the lead's name.
    /// `text` is accepted for backward compatibility with older flows.
    pub fn is_name_source(&self) -> bool {
        matches!(self, QuestionType::Name | QuestionType::Text)
    }
}

/// Calendar integration settings (consumed by the external scheduling
/// provider, not interpreted by the widget runtime).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    pub provider: String,
    /// Meeting duration in minutes.
    pub duration: u32,
    #[serde(default)]
    pub available_days: Vec<String>,
    pub available_hours: CalendarHours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarHours {
    /// "HH:mm"
    pub start: String,
    /// "HH:mm"
    pub end: String,
}

/// Proactive-message configuration as persisted. All timings in seconds.
///
/// Fields default to falsy values so a partially-filled row deserializes;
/// the config normalizer decides whether the result is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveMessages {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub messages: Vec<String>,
    /// Seconds before the first message.
    #[serde(default)]
    pub delay: u64,
    /// Seconds between subsequent messages.
    #[serde(default)]
    pub interval: u64,
    /// Hard cap on messages shown per session.
    #[serde(default)]
    pub max_messages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(label: &str, question_type: QuestionType, required: bool) -> Question {
        Question {
            id: format!("q-{label}"),
            question_type,
            label: label.to_string(),
            required,
            options: None,
            calendar: None,
        }
    }

    fn valid_flow() -> FlowData {
        FlowData {
            welcome_message: "Hello!".into(),
            end_message: "Bye!".into(),
            show_end_screen: false,
            proactive_messages: None,
            options: vec![FlowOption {
                id: "opt-1".into(),
                label: "Get a quote".into(),
                flow: vec![question("What's your name?", QuestionType::Name, true)],
            }],
        }
    }

    #[test]
    fn valid_flow_passes() {
        assert!(valid_flow().validate().is_ok());
    }

    #[test]
    fn empty_welcome_message_rejected() {
        let mut flow = valid_flow();
        flow.welcome_message = "  ".into();
        assert_eq!(flow.validate(), Err(FlowError::EmptyWelcomeMessage));
    }

    #[test]
    fn empty_end_message_rejected() {
        let mut flow = valid_flow();
        flow.end_message = String::new();
        assert_eq!(flow.validate(), Err(FlowError::EmptyEndMessage));
    }

    #[test]
    fn empty_options_rejected() {
        let mut flow = valid_flow();
        flow.options.clear();
        assert_eq!(flow.validate(), Err(FlowError::NoOptions));
    }

    #[test]
    fn option_lookup_by_label_and_id() {
        let flow = valid_flow();
        assert_eq!(flow.option_by_label("Get a quote").unwrap().id, "opt-1");
        assert_eq!(flow.option_by_id("opt-1").unwrap().label, "Get a quote");
        assert!(flow.option_by_label("Missing").is_none());
    }

    #[test]
    fn question_type_wire_names() {
        let q = question("Email?", QuestionType::Email, true);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["type"], "email");

        let parsed: Question = serde_json::from_value(serde_json::json!({
            "id": "q1",
            "type": "phone",
            "label": "Phone?",
            "required": false,
        }))
        .unwrap();
        assert_eq!(parsed.question_type, QuestionType::Phone);
        assert!(!parsed.required);
    }

    #[test]
    fn flow_data_camel_case_round_trip() {
        let data = valid_flow();
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("welcomeMessage").is_some());
        assert!(json.get("endMessage").is_some());
        let back: FlowData = serde_json::from_value(json).unwrap();
        assert_eq!(back.welcome_message, data.welcome_message);
    }

    #[test]
    fn name_source_types() {
        assert!(QuestionType::Name.is_name_source());
        assert!(QuestionType::Text.is_name_source());
        assert!(!QuestionType::Email.is_name_source());
        assert!(!QuestionType::Phone.is_name_source());
    }
}
