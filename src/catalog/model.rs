//! Step catalog data model: field descriptors, steps, and the catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Declared input type of a field.
///
/// Serialized as the kebab-case wire string. Anything unrecognised is kept
/// verbatim in `Unknown` so a misconfigured catalog stays visible instead of
/// being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    MultilineText,
    YesNo,
    Unknown(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::MultilineText => "multiline-text",
            Self::YesNo => "yes-no",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether answers to this field are booleans rather than text.
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::YesNo)
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "text" => Self::Text,
            "multiline-text" => Self::MultilineText,
            "yes-no" => Self::YesNo,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        match ty {
            FieldType::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Static metadata describing one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
}

impl FieldDescriptor {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            field_type,
            required: false,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Label shown to the user, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// One wizard screen: an ordered group of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step {
    pub fields: Vec<FieldDescriptor>,
}

impl Step {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// The full ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepCatalog {
    steps: Vec<Step>,
}

impl StepCatalog {
    /// Build a catalog, checking that field names are non-empty and unique
    /// within each step.
    pub fn new(steps: Vec<Step>) -> Result<Self, CatalogError> {
        let catalog = Self { steps };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for (step_index, step) in self.steps.iter().enumerate() {
            let mut seen = HashSet::new();
            for (position, field) in step.fields.iter().enumerate() {
                if field.name.is_empty() {
                    return Err(CatalogError::EmptyName {
                        step: step_index,
                        position,
                    });
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(CatalogError::DuplicateField {
                        step: step_index,
                        name: field.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the terminal step, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }
}

/// Wire envelope for `GET /api/onboarding`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub steps: StepCatalog,
}
