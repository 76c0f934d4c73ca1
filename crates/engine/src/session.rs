//! Async driver for one chat session.
//!
//! Owns the rendered transcript and executes the state machine's effects
//! in order: typing pauses, transcript appends, interaction tracking and
//! the lead submission round-trip. Every step is awaited before the next
//! one runs, which is what guarantees transcript ordering.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use uuid::Uuid;

use leadflow_config::{NormalizedConfig, TypingSettings};
use leadflow_core::{
    ChatInteraction, ChatMessage, Feedback, InteractionKind, LeadSink, LocationLookup, Sender,
    PREVIEW_CHATBOT_ID,
};

use crate::conversation::{Conversation, Effect, Phase};
use crate::error::ConversationError;
use crate::submit::build_lead;

/// Delay between the completion message and the feedback screen.
const END_SCREEN_DELAY: Duration = Duration::from_secs(1);

/// One visitor's chat session: conversation state, transcript and the
/// async plumbing around them.
pub struct ChatSession {
    chatbot_id: String,
    conversation: Conversation,
    transcript: Vec<ChatMessage>,
    typing: TypingSettings,
    sink: Arc<dyn LeadSink>,
    location: Arc<dyn LocationLookup>,
    session_id: String,
    converted: bool,
    feedback_given: bool,
}

impl ChatSession {
    pub fn new(
        chatbot_id: impl Into<String>,
        config: &NormalizedConfig,
        typing: TypingSettings,
        sink: Arc<dyn LeadSink>,
        location: Arc<dyn LocationLookup>,
    ) -> Self {
        let conversation = Conversation::new(config.flow.clone());
        let transcript = vec![Self::welcome_message(&conversation)];
        Self {
            chatbot_id: chatbot_id.into(),
            conversation,
            transcript,
            typing,
            sink,
            location,
            session_id: Uuid::new_v4().to_string(),
            converted: false,
            feedback_given: false,
        }
    }

    fn welcome_message(conversation: &Conversation) -> ChatMessage {
        ChatMessage::with_id("welcome", &conversation.flow().welcome_message, Sender::Bot)
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn phase(&self) -> &Phase {
        self.conversation.phase()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn converted(&self) -> bool {
        self.converted
    }

    /// Preview sessions run the full conversation but persist nothing.
    pub fn is_preview(&self) -> bool {
        self.chatbot_id == PREVIEW_CHATBOT_ID
    }

    pub fn end_screen_visible(&self) -> bool {
        matches!(self.conversation.phase(), Phase::EndScreen)
    }

    pub async fn select_option(&mut self, label: &str) -> Result<(), ConversationError> {
        let effects = self.conversation.select_option(label)?;
        self.run_effects(effects).await;
        Ok(())
    }

    pub async fn answer(&mut self, value: &str) -> Result<(), ConversationError> {
        let effects = self.conversation.submit_answer(value)?;
        self.run_effects(effects).await;
        Ok(())
    }

    pub async fn skip(&mut self) -> Result<(), ConversationError> {
        let effects = self.conversation.skip()?;
        self.run_effects(effects).await;
        Ok(())
    }

    pub async fn close_end_screen(&mut self) {
        let effects = self.conversation.close_end_screen();
        self.run_effects(effects).await;
    }

    /// Chat window opened.
    pub async fn opened(&mut self) {
        self.track(InteractionKind::Open).await;
    }

    /// Chat window closed. In-flight work is unaffected.
    pub async fn closed(&mut self) {
        self.track(InteractionKind::Close).await;
    }

    /// Append a proactive message the visitor clicked through.
    pub fn append_proactive(&mut self, content: &str) {
        self.transcript.push(ChatMessage::bot(content));
    }

    /// Record end-screen feedback, at most once per session.
    pub async fn submit_feedback(&mut self, satisfied: bool) {
        if self.feedback_given || self.is_preview() {
            return;
        }
        self.feedback_given = true;
        let feedback = Feedback {
            chatbot_id: self.chatbot_id.clone(),
            satisfied,
        };
        if let Err(err) = self.sink.insert_feedback(&feedback).await {
            tracing::error!(error = %err, "failed to persist feedback");
        }
    }

    async fn run_effects(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::AppendUser(message) | Effect::AppendBot(message) => {
                    self.transcript.push(message);
                }
                Effect::Typing => {
                    let ms = {
                        let mut rng = rand::thread_rng();
                        rng.gen_range(self.typing.min_ms..=self.typing.max_ms)
                    };
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                }
                Effect::Track(kind) => {
                    self.track(kind).await;
                }
                Effect::SubmitLead => {
                    let follow_up = self.submit_lead().await;
                    for effect in follow_up.into_iter().rev() {
                        queue.push_front(effect);
                    }
                }
                Effect::ShowEndScreen => {
                    tokio::time::sleep(END_SCREEN_DELAY).await;
                    self.conversation.end_screen_shown();
                }
                Effect::Reset => {
                    self.conversation.reset();
                    self.transcript = vec![Self::welcome_message(&self.conversation)];
                }
            }
        }
    }

    /// The submission round-trip: enrich, build, persist. Returns the
    /// follow-up effects from the success or failure transition.
    async fn submit_lead(&mut self) -> Vec<Effect> {
        let Some(option) = self.conversation.current_option().cloned() else {
            tracing::warn!("lead submission without a selected option");
            return self.conversation.submission_failed();
        };

        let location = self.location.fetch_location().await;
        let lead = match build_lead(
            &self.chatbot_id,
            &option,
            self.conversation.answers(),
            location,
        ) {
            Ok(lead) => lead,
            Err(err) => {
                tracing::warn!(error = %err, "lead assembly failed");
                return self.conversation.submission_failed();
            }
        };

        if self.is_preview() {
            self.converted = true;
            return self.conversation.submission_succeeded();
        }

        match self.sink.insert_lead(&lead).await {
            Ok(()) => {
                self.converted = true;
                tracing::info!(chatbot_id = %self.chatbot_id, "lead captured");
                self.conversation.submission_succeeded()
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to persist lead");
                self.conversation.submission_failed()
            }
        }
    }

    async fn track(&self, kind: InteractionKind) {
        if self.is_preview() {
            return;
        }
        let event = ChatInteraction {
            chatbot_id: self.chatbot_id.clone(),
            kind,
            session_id: self.session_id.clone(),
            converted: self.converted,
        };
        if let Err(err) = self.sink.record_interaction(&event).await {
            tracing::debug!(error = %err, "interaction tracking failed");
        }
    }
}
