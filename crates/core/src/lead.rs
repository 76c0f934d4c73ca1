//! Lead, feedback, and interaction-event records.

use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;

/// Name used when no name/text-typed answer was supplied.
pub const DEFAULT_LEAD_NAME: &str = "Anonymous";
/// Placeholder used when no email-typed answer was supplied.
pub const DEFAULT_LEAD_EMAIL: &str = "no-email@example.com";

/// The persisted outcome of a completed conversation. Created once at flow
/// completion and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub chatbot_id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: LocationData,
    /// Full raw answer map, including the selected option's label under
    /// the reserved key.
    pub answers: AnswerMap,
}

/// Best-effort IP geolocation result. All fields optional; an empty value
/// is a legitimate outcome when every provider fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl LocationData {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.country.is_none() && self.region.is_none() && self.ip.is_none()
    }
}

/// Satisfaction signal collected from the end screen, at most once per
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub chatbot_id: String,
    pub satisfied: bool,
}

/// Widget interaction event kind, recorded for the analytics surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Open,
    Close,
    StartFlow,
}

/// One chat interaction event row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInteraction {
    pub chatbot_id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub session_id: String,
    pub converted: bool,
}

/// Page metadata supplied by the embedding site, used for proactive-message
/// personalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_location_detected() {
        assert!(LocationData::default().is_empty());
        let loc = LocationData {
            ip: Some("1.2.3.4".into()),
            ..Default::default()
        };
        assert!(!loc.is_empty());
    }

    #[test]
    fn interaction_kind_wire_names() {
        let event = ChatInteraction {
            chatbot_id: "c1".into(),
            kind: InteractionKind::StartFlow,
            session_id: "s1".into(),
            converted: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "start_flow");
    }

    #[test]
    fn lead_omits_absent_phone() {
        let lead = Lead {
            chatbot_id: "c1".into(),
            name: DEFAULT_LEAD_NAME.into(),
            email: DEFAULT_LEAD_EMAIL.into(),
            phone: None,
            location: LocationData::default(),
            answers: AnswerMap::new(),
        };
        let json = serde_json::to_value(&lead).unwrap();
        assert!(json.get("phone").is_none());
        assert_eq!(json["name"], DEFAULT_LEAD_NAME);
    }
}
