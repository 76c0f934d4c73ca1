//! Per-answer validation.
//!
//! Validation blocks only the current question; it never mutates
//! conversation state. Empty input on an optional question passes (the
//! skip path is separate and records nothing).

use once_cell::sync::Lazy;
use regex::Regex;

use leadflow_core::{Question, QuestionType};

use crate::error::AnswerError;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{3}[)]?[-\s.]?[0-9]{3}[-\s.]?[0-9]{4,6}$")
        .expect("phone pattern compiles")
});

/// Validate a raw answer against the question's type and `required` flag.
pub fn validate_answer(question: &Question, value: &str) -> Result<(), AnswerError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        if question.required {
            return Err(AnswerError::Required);
        }
        return Ok(());
    }

    match question.question_type {
        QuestionType::Email => {
            if !trimmed.contains('@') {
                return Err(AnswerError::InvalidEmail);
            }
        }
        QuestionType::Phone => {
            if !PHONE_RE.is_match(trimmed) {
                return Err(AnswerError::InvalidPhone);
            }
        }
        _ => {}
    }

    Ok(())
}
