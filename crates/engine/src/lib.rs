//! Conversation engine for the leadflow chat widget.
//!
//! The state machines ([`Conversation`], [`ProactiveScheduler`]) are pure:
//! they return effect lists and never sleep or touch I/O. [`ChatSession`]
//! is the async driver that executes those effects against real timers and
//! the persistence traits.

pub mod answer;
pub mod conversation;
pub mod error;
pub mod proactive;
pub mod session;
pub mod submit;

pub use answer::validate_answer;
pub use conversation::{Conversation, Effect, Phase, SKIPPED_MESSAGE, SUBMIT_FAILED_MESSAGE};
pub use error::{AnswerError, ConversationError, SubmitError};
pub use proactive::{ProactiveScheduler, SchedulerEffect, SchedulerEvent, SchedulerPhase};
pub use session::ChatSession;
pub use submit::build_lead;
