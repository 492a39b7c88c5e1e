//! Answers accumulated over a wizard session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{FieldDescriptor, FieldType};

/// A single answer: raw text for text inputs, checked state for toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(_) => None,
        }
    }
}

/// Field name → answer. Entries are never pruned, so values entered on one
/// step survive navigating away from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnboardingAnswers {
    values: HashMap<String, AnswerValue>,
}

impl OnboardingAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: AnswerValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn set_text(&mut self, name: &str, text: &str) {
        self.set(name, AnswerValue::Text(text.to_string()));
    }

    pub fn set_flag(&mut self, name: &str, checked: bool) {
        self.set(name, AnswerValue::Flag(checked));
    }

    pub fn get(&self, name: &str) -> Option<&AnswerValue> {
        self.values.get(name)
    }

    /// Whether the stored answer is a present, non-empty value of the type
    /// the field declares.
    pub fn satisfies(&self, field: &FieldDescriptor) -> bool {
        match (&field.field_type, self.get(&field.name)) {
            (FieldType::YesNo, Some(AnswerValue::Flag(_))) => true,
            (FieldType::Text | FieldType::MultilineText, Some(AnswerValue::Text(text))) => {
                !text.is_empty()
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
