//! Insertion-ordered answer map.
//!
//! Answers are keyed by question label and must serialize in the order the
//! user gave them, so a plain `HashMap`/`BTreeMap` does not fit. Repeated
//! keys overwrite in place (the entry keeps its original position), which
//! matches how a re-answered question behaves in the conversation.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Reserved answer-map key holding the selected option's label.
pub const FLOW_OPTION_KEY: &str = "Flow Option";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    entries: Vec<(String, String)>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Overwrites keep the entry's original position.
    pub fn insert(&mut self, label: impl Into<String>, answer: impl Into<String>) {
        let label = label.into();
        let answer = answer.into();
        match self.entries.iter_mut().find(|(k, _)| *k == label) {
            Some((_, v)) => *v = answer,
            None => self.entries.push((label, answer)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Serialize for AnswerMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AnswerMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AnswerMapVisitor;

        impl<'de> Visitor<'de> for AnswerMapVisitor {
            type Value = AnswerMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of question labels to answers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut answers = AnswerMap::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    answers.insert(k, v);
                }
                Ok(answers)
            }
        }

        deserializer.deserialize_map(AnswerMapVisitor)
    }
}
