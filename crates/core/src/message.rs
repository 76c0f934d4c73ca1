//! Transcript message shape.

use serde::{Deserialize, Serialize};

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
    User,
}

/// A single entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
}

impl ChatMessage {
    pub fn bot(content: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), content, Sender::Bot)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), content, Sender::User)
    }

    /// Messages with well-known roles (welcome, error, completion) carry a
    /// fixed id so they can be recognized in the transcript.
    pub fn with_id(id: impl Into<String>, content: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_sender() {
        assert_eq!(ChatMessage::bot("hi").sender, Sender::Bot);
        assert_eq!(ChatMessage::user("hi").sender, Sender::User);
    }

    #[test]
    fn sender_wire_names() {
        let msg = ChatMessage::with_id("welcome", "Hello", Sender::Bot);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "bot");
        assert_eq!(json["id"], "welcome");
    }
}
