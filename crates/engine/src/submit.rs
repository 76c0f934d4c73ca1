//! Lead assembly.
//!
//! Maps the free-form answer map onto the structured lead columns by
//! walking the option's questions in flow order: the first answered
//! name-capable question wins `name`, the last answered email/phone
//! questions win `email`/`phone`. Unmapped answers still travel in the
//! lead's raw answer payload.

use leadflow_core::{
    AnswerMap, FlowOption, Lead, LocationData, QuestionType, DEFAULT_LEAD_EMAIL, DEFAULT_LEAD_NAME,
};

use crate::error::SubmitError;

/// Assemble a [`Lead`] from the answers collected for `option`.
///
/// Fails only when a required question has no recorded answer; partial
/// leads for incomplete required flows are never produced.
pub fn build_lead(
    chatbot_id: &str,
    option: &FlowOption,
    answers: &AnswerMap,
    location: LocationData,
) -> Result<Lead, SubmitError> {
    for question in option.required_questions() {
        let answered = answers
            .get(&question.label)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        if !answered {
            return Err(SubmitError::MissingRequired {
                label: question.label.clone(),
            });
        }
    }

    let mut name: Option<&str> = None;
    let mut email: Option<&str> = None;
    let mut phone: Option<&str> = None;

    for question in &option.flow {
        let Some(value) = answers.get(&question.label).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        match question.question_type {
            QuestionType::Email => email = Some(value),
            QuestionType::Phone => phone = Some(value),
            kind if kind.is_name_source() => {
                if name.is_none() {
                    name = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(Lead {
        chatbot_id: chatbot_id.to_string(),
        name: name.unwrap_or(DEFAULT_LEAD_NAME).to_string(),
        email: email.unwrap_or(DEFAULT_LEAD_EMAIL).to_string(),
        phone: phone.map(str::to_string),
        location,
        answers: answers.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::Question;

    fn question(label: &str, kind: QuestionType, required: bool) -> Question {
        Question {
            id: format!("q-{label}"),
            question_type: kind,
            label: label.to_string(),
            required,
            options: None,
            calendar: None,
        }
    }

    fn option() -> FlowOption {
        FlowOption {
            id: "o1".into(),
            label: "Sales".into(),
            flow: vec![
                question("First name", QuestionType::Name, true),
                question("Nickname", QuestionType::Text, false),
                question("Work email", QuestionType::Email, false),
                question("Personal email", QuestionType::Email, false),
                question("Phone", QuestionType::Phone, false),
            ],
        }
    }

    #[test]
    fn first_name_source_wins() {
        let mut answers = AnswerMap::new();
        answers.insert("First name", "Ada");
        answers.insert("Nickname", "Lovelace");
        let lead = build_lead("cb", &option(), &answers, LocationData::default()).unwrap();
        assert_eq!(lead.name, "Ada");
    }

    #[test]
    fn last_email_wins() {
        let mut answers = AnswerMap::new();
        answers.insert("First name", "Ada");
        answers.insert("Work email", "work@example.com");
        answers.insert("Personal email", "home@example.com");
        let lead = build_lead("cb", &option(), &answers, LocationData::default()).unwrap();
        assert_eq!(lead.email, "home@example.com");
    }

    #[test]
    fn defaults_when_unmapped() {
        let mut answers = AnswerMap::new();
        answers.insert("First name", "Ada");
        let lead = build_lead("cb", &option(), &answers, LocationData::default()).unwrap();
        assert_eq!(lead.email, DEFAULT_LEAD_EMAIL);
        assert_eq!(lead.phone, None);
    }

    #[test]
    fn skipped_text_does_not_shadow_name() {
        let opt = FlowOption {
            id: "o1".into(),
            label: "Sales".into(),
            flow: vec![
                question("Comment", QuestionType::Text, false),
                question("Name", QuestionType::Name, false),
            ],
        };
        let mut answers = AnswerMap::new();
        answers.insert("Name", "Grace");
        let lead = build_lead("cb", &opt, &answers, LocationData::default()).unwrap();
        assert_eq!(lead.name, "Grace");
    }

    #[test]
    fn missing_required_blocks_lead() {
        let answers = AnswerMap::new();
        let err = build_lead("cb", &option(), &answers, LocationData::default()).unwrap_err();
        assert_eq!(
            err,
            SubmitError::MissingRequired {
                label: "First name".into()
            }
        );
    }

    #[test]
    fn answers_travel_verbatim() {
        let mut answers = AnswerMap::new();
        answers.insert("First name", "Ada");
        answers.insert("Phone", "+1234567890");
        let lead = build_lead("cb", &option(), &answers, LocationData::default()).unwrap();
        assert_eq!(lead.answers.get("Phone"), Some("+1234567890"));
        assert_eq!(lead.phone.as_deref(), Some("+1234567890"));
    }
}
