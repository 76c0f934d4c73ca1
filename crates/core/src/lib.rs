//! Core types and trait seams for the leadflow chat widget runtime.
//!
//! Everything in this crate is plain data plus the async traits the rest of
//! the workspace plugs into: the conversation flow model, the transcript
//! message shape, the answer map, the lead record, and the store/lookup
//! traits the persistence layer implements.

pub mod answers;
pub mod error;
pub mod flow;
pub mod lead;
pub mod message;
pub mod traits;

pub use answers::{AnswerMap, FLOW_OPTION_KEY};
pub use error::{FlowError, StoreError};
pub use flow::{CalendarHours, CalendarSettings, Flow, FlowData, FlowOption, ProactiveMessages, Question, QuestionType};
pub use lead::{
    ChatInteraction, Feedback, InteractionKind, Lead, LocationData, PageContext, DEFAULT_LEAD_EMAIL,
    DEFAULT_LEAD_NAME,
};
pub use message::{ChatMessage, Sender};
pub use traits::{FlowStore, LeadSink, LocationLookup};

/// Chatbot id reserved for dashboard preview sessions. Preview sessions
/// never persist leads, feedback, or interaction events.
pub const PREVIEW_CHATBOT_ID: &str = "00000000-0000-0000-0000-000000000000";
