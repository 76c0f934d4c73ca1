//! Conversation state machine.
//!
//! Pure with respect to time and I/O: every operation returns the list of
//! [`Effect`]s the async driver must execute (transcript appends, typing
//! pauses, tracking, submission). The machine itself never sleeps and
//! never touches the network, which is what makes the test timelines
//! deterministic.

use leadflow_core::{
    AnswerMap, ChatMessage, FlowData, FlowOption, InteractionKind, Question, Sender,
    FLOW_OPTION_KEY,
};

use crate::answer::validate_answer;
use crate::error::ConversationError;

/// Shown when lead persistence fails. The conversation stays on the last
/// question so the visitor can retry.
pub const SUBMIT_FAILED_MESSAGE: &str =
    "Sorry, there was an error submitting your information. Please try again.";

/// Literal transcript entry for a skipped optional question.
pub const SKIPPED_MESSAGE: &str = "Skipped";

/// Where the conversation currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Welcome shown, waiting for the visitor to pick a flow option.
    AwaitingOption,
    /// Walking the selected option's questions in order.
    AwaitingAnswer {
        option_id: String,
        question_index: usize,
    },
    /// Lead submission in flight.
    Submitting {
        option_id: String,
        question_index: usize,
    },
    /// Lead persisted; no further answers accepted.
    Completed,
    /// Feedback screen visible.
    EndScreen,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::AwaitingOption => "awaiting_option",
            Phase::AwaitingAnswer { .. } => "awaiting_answer",
            Phase::Submitting { .. } => "submitting",
            Phase::Completed => "completed",
            Phase::EndScreen => "end_screen",
        }
    }
}

/// Side effects for the async driver, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a visitor message to the transcript.
    AppendUser(ChatMessage),
    /// Uniform 1–2 s pause before the next bot append.
    Typing,
    /// Append a bot message to the transcript.
    AppendBot(ChatMessage),
    /// Record an interaction event, best effort.
    Track(InteractionKind),
    /// Assemble and persist the lead for the current option.
    SubmitLead,
    /// Reveal the feedback screen after a fixed 1 s delay.
    ShowEndScreen,
    /// Clear transcript and answers on the next tick.
    Reset,
}

/// The conversation-flow state machine for one chat session.
#[derive(Debug)]
pub struct Conversation {
    flow: FlowData,
    phase: Phase,
    answers: AnswerMap,
}

impl Conversation {
    pub fn new(flow: FlowData) -> Self {
        Self {
            flow,
            phase: Phase::AwaitingOption,
            answers: AnswerMap::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn flow(&self) -> &FlowData {
        &self.flow
    }

    /// The option being walked, if any.
    pub fn current_option(&self) -> Option<&FlowOption> {
        match &self.phase {
            Phase::AwaitingAnswer { option_id, .. } | Phase::Submitting { option_id, .. } => {
                self.flow.option_by_id(option_id)
            }
            _ => None,
        }
    }

    /// The question currently awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&Question> {
        match &self.phase {
            Phase::AwaitingAnswer {
                option_id,
                question_index,
            } => self
                .flow
                .option_by_id(option_id)
                .and_then(|o| o.flow.get(*question_index)),
            _ => None,
        }
    }

    /// Visitor picked a flow option by its button label.
    pub fn select_option(&mut self, label: &str) -> Result<Vec<Effect>, ConversationError> {
        if self.phase != Phase::AwaitingOption {
            return Err(self.wrong_phase());
        }
        let option = self
            .flow
            .option_by_label(label)
            .ok_or_else(|| ConversationError::UnknownOption(label.to_string()))?;
        let option_id = option.id.clone();
        let first_question = option.flow.first().map(|q| q.label.clone());

        self.answers.insert(FLOW_OPTION_KEY, label);

        let mut effects = vec![
            Effect::AppendUser(ChatMessage::user(label)),
            Effect::Track(InteractionKind::StartFlow),
        ];
        match first_question {
            Some(prompt) => {
                self.phase = Phase::AwaitingAnswer {
                    option_id,
                    question_index: 0,
                };
                effects.push(Effect::Typing);
                effects.push(Effect::AppendBot(ChatMessage::bot(prompt)));
            }
            // An option with no questions submits immediately.
            None => {
                self.phase = Phase::Submitting {
                    option_id,
                    question_index: 0,
                };
                effects.push(Effect::SubmitLead);
            }
        }
        Ok(effects)
    }

    /// Visitor answered the current question.
    pub fn submit_answer(&mut self, value: &str) -> Result<Vec<Effect>, ConversationError> {
        let (option_id, question_index) = match &self.phase {
            Phase::AwaitingAnswer {
                option_id,
                question_index,
            } => (option_id.clone(), *question_index),
            _ => return Err(self.wrong_phase()),
        };
        let question = self
            .current_question()
            .ok_or_else(|| self.wrong_phase())?;
        validate_answer(question, value)?;
        let label = question.label.clone();

        self.answers.insert(label, value);

        let mut effects = vec![Effect::AppendUser(ChatMessage::user(value))];
        effects.extend(self.advance(option_id, question_index));
        Ok(effects)
    }

    /// Visitor skipped the current question. Only optional questions may
    /// be skipped; no answer entry is written.
    pub fn skip(&mut self) -> Result<Vec<Effect>, ConversationError> {
        let (option_id, question_index) = match &self.phase {
            Phase::AwaitingAnswer {
                option_id,
                question_index,
            } => (option_id.clone(), *question_index),
            _ => return Err(self.wrong_phase()),
        };
        let question = self
            .current_question()
            .ok_or_else(|| self.wrong_phase())?;
        if question.required {
            return Err(ConversationError::SkipRequired);
        }

        let mut effects = vec![Effect::AppendUser(ChatMessage::user(SKIPPED_MESSAGE))];
        effects.extend(self.advance(option_id, question_index));
        Ok(effects)
    }

    /// Move to the next question, or into submission after the last one.
    fn advance(&mut self, option_id: String, question_index: usize) -> Vec<Effect> {
        let next_index = question_index + 1;
        let next_prompt = self
            .flow
            .option_by_id(&option_id)
            .and_then(|o| o.flow.get(next_index))
            .map(|q| q.label.clone());

        match next_prompt {
            Some(prompt) => {
                self.phase = Phase::AwaitingAnswer {
                    option_id,
                    question_index: next_index,
                };
                vec![Effect::Typing, Effect::AppendBot(ChatMessage::bot(prompt))]
            }
            None => {
                self.phase = Phase::Submitting {
                    option_id,
                    question_index,
                };
                vec![Effect::SubmitLead]
            }
        }
    }

    /// Lead persisted. Appends the end message and, if configured, reveals
    /// the feedback screen.
    pub fn submission_succeeded(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::Submitting { .. }) {
            tracing::warn!(phase = self.phase.name(), "submission result in unexpected phase");
            return Vec::new();
        }
        self.phase = Phase::Completed;
        let mut effects = vec![
            Effect::Typing,
            Effect::AppendBot(ChatMessage::with_id(
                "completion",
                &self.flow.end_message,
                Sender::Bot,
            )),
        ];
        if self.flow.show_end_screen {
            effects.push(Effect::ShowEndScreen);
        }
        effects
    }

    /// Lead persistence failed. The same question is re-presented and the
    /// visitor can retry; there is no automatic retry.
    pub fn submission_failed(&mut self) -> Vec<Effect> {
        let (option_id, question_index) = match &self.phase {
            Phase::Submitting {
                option_id,
                question_index,
            } => (option_id.clone(), *question_index),
            _ => {
                tracing::warn!(phase = self.phase.name(), "submission result in unexpected phase");
                return Vec::new();
            }
        };
        self.phase = Phase::AwaitingAnswer {
            option_id,
            question_index,
        };
        vec![Effect::AppendBot(ChatMessage::with_id(
            "submit-error",
            SUBMIT_FAILED_MESSAGE,
            Sender::Bot,
        ))]
    }

    /// Driver signal: the 1 s end-screen delay elapsed.
    pub fn end_screen_shown(&mut self) {
        if self.phase == Phase::Completed {
            self.phase = Phase::EndScreen;
        }
    }

    /// Visitor dismissed the feedback screen. The reset itself is deferred
    /// one tick so the closing frame renders before the transcript clears.
    pub fn close_end_screen(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::EndScreen | Phase::Completed => vec![Effect::Reset],
            _ => Vec::new(),
        }
    }

    /// Apply the deferred reset: cleared answers, fresh phase. The driver
    /// rebuilds the transcript with only the welcome message.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.phase = Phase::AwaitingOption;
    }

    fn wrong_phase(&self) -> ConversationError {
        ConversationError::WrongPhase {
            phase: self.phase.name(),
        }
    }
}
