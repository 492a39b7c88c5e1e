//! Render model for the wizard: which widget each field gets and which
//! navigation buttons are shown.

use serde::Serialize;
use tracing::warn;

use super::answers::OnboardingAnswers;
use super::state::WizardState;
use crate::catalog::{FieldDescriptor, FieldType};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_DATA_MESSAGE: &str = "No onboarding data found";
pub const INCOMPLETE_MESSAGE: &str = "Please fill all the required fields before proceeding.";

/// Input widget selected by a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum FieldWidget {
    /// Text entry; `multiline` for `multiline-text` fields.
    TextInput {
        name: String,
        label: String,
        required: bool,
        multiline: bool,
        value: String,
    },
    /// Binary toggle for `yes-no` fields.
    Toggle {
        name: String,
        label: String,
        checked: bool,
    },
    /// Placeholder for a type the wizard cannot render. Accepts no input.
    Unsupported { name: String, declared_type: String },
}

impl FieldWidget {
    pub fn name(&self) -> &str {
        match self {
            Self::TextInput { name, .. }
            | Self::Toggle { name, .. }
            | Self::Unsupported { name, .. } => name,
        }
    }
}

/// Pick the widget for a field, filled with its current answer.
pub fn render_field(field: &FieldDescriptor, answers: &OnboardingAnswers) -> FieldWidget {
    let name = field.name.clone();
    let label = field.display_label().to_string();
    let answer = answers.get(&field.name);

    match &field.field_type {
        FieldType::Text | FieldType::MultilineText => FieldWidget::TextInput {
            name,
            label,
            required: field.required,
            multiline: field.field_type == FieldType::MultilineText,
            value: answer
                .and_then(|a| a.as_text())
                .unwrap_or_default()
                .to_string(),
        },
        FieldType::YesNo => FieldWidget::Toggle {
            name,
            label,
            checked: answer.and_then(|a| a.as_flag()).unwrap_or(false),
        },
        FieldType::Unknown(declared) => {
            warn!(
                field = %field.name,
                declared_type = %declared,
                "Catalog field has an unsupported type; rendering placeholder"
            );
            FieldWidget::Unsupported {
                name,
                declared_type: declared.clone(),
            }
        }
    }
}

/// Navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    Back,
    Next,
    Finish,
}

impl NavAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Back => "Back",
            Self::Next => "Next",
            Self::Finish => "Finish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavButton {
    pub action: NavAction,
    pub enabled: bool,
}

/// One rendered step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub title: String,
    pub fields: Vec<FieldWidget>,
    /// Present while the step is incomplete.
    pub validation_message: Option<&'static str>,
    pub buttons: Vec<NavButton>,
}

impl StepView {
    pub fn button(&self, action: NavAction) -> Option<&NavButton> {
        self.buttons.iter().find(|b| b.action == action)
    }
}

/// What the wizard shows right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum WizardView {
    Loading,
    Error { message: String },
    NoData,
    Step(StepView),
}

impl WizardState {
    pub fn view(&self) -> WizardView {
        if self.is_loading() {
            return WizardView::Loading;
        }
        if let Some(message) = self.error() {
            return WizardView::Error {
                message: message.to_string(),
            };
        }
        let Some(step) = self.current_step() else {
            return WizardView::NoData;
        };

        let complete = self.is_step_complete(step);
        let mut buttons = Vec::with_capacity(2);
        if !self.is_first_step() {
            buttons.push(NavButton {
                action: NavAction::Back,
                enabled: true,
            });
        }
        if self.is_last_step() {
            buttons.push(NavButton {
                action: NavAction::Finish,
                enabled: complete,
            });
        } else {
            buttons.push(NavButton {
                action: NavAction::Next,
                enabled: complete,
            });
        }

        WizardView::Step(StepView {
            title: format!("Step {} of {}", self.current_index() + 1, self.step_count()),
            fields: step
                .fields
                .iter()
                .map(|f| render_field(f, self.answers()))
                .collect(),
            validation_message: (!complete).then_some(INCOMPLETE_MESSAGE),
            buttons,
        })
    }
}
