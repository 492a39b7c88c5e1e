//! Onboarding wizard: the client side of the flow.
//!
//! The wizard fetches the catalog once, then walks the steps locally:
//! answers accumulate in memory, each step is gated on its required fields,
//! and Finish redirects home without submitting anything.

pub mod answers;
pub mod client;
pub mod render;
pub mod state;
pub mod terminal;

pub use answers::{AnswerValue, OnboardingAnswers};
pub use client::{CatalogClient, CatalogSource};
pub use render::{FieldWidget, NavAction, NavButton, StepView, WizardView, render_field};
pub use state::{HOME_ROUTE, NavigationState, Redirect, WizardState};
pub use terminal::{Outcome, TerminalWizard, format_view};
