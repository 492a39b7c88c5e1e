//! Wizard state machine over the step catalog.
//!
//! States are the step indices `0..N`. Next requires the current step to be
//! complete, Back only requires a previous step, and Finish is only reachable
//! from the last step once it is complete. Before the catalog arrives the
//! wizard is `loading` and refuses every action.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::answers::{AnswerValue, OnboardingAnswers};
use super::client::CatalogSource;
use crate::catalog::{Step, StepCatalog};
use crate::error::{FetchError, WizardError};

/// Route the wizard redirects to on Finish.
pub const HOME_ROUTE: &str = "/home";

/// Navigation state carried by the Finish redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub onboarding: bool,
}

/// Client-side redirect produced by Finish. No network call accompanies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub target: String,
    pub state: NavigationState,
}

impl Redirect {
    pub fn home_after_onboarding() -> Self {
        Self {
            target: HOME_ROUTE.to_string(),
            state: NavigationState { onboarding: true },
        }
    }
}

/// In-memory state of one wizard session.
#[derive(Debug, Clone)]
pub struct WizardState {
    catalog: StepCatalog,
    current: usize,
    answers: OnboardingAnswers,
    loading: bool,
    error: Option<String>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    /// A wizard still waiting for its catalog.
    pub fn new() -> Self {
        Self {
            catalog: StepCatalog::default(),
            current: 0,
            answers: OnboardingAnswers::new(),
            loading: true,
            error: None,
        }
    }

    /// A wizard that already has its catalog.
    pub fn with_catalog(catalog: StepCatalog) -> Self {
        let mut state = Self::new();
        state.catalog_loaded(catalog);
        state
    }

    /// Fetch the catalog once and leave the loading state, whatever the
    /// outcome.
    pub async fn load(source: &dyn CatalogSource) -> Self {
        let mut state = Self::new();
        match source.fetch_catalog().await {
            Ok(catalog) => state.catalog_loaded(catalog),
            Err(e) => state.catalog_failed(&e),
        }
        state
    }

    pub fn catalog_loaded(&mut self, catalog: StepCatalog) {
        info!(steps = catalog.len(), "Onboarding catalog loaded");
        self.catalog = catalog;
        self.current = 0;
        self.loading = false;
    }

    /// A failed fetch is logged and otherwise swallowed: the wizard ends up
    /// with no steps and no error message.
    pub fn catalog_failed(&mut self, err: &FetchError) {
        error!(error = %err, "Failed to fetch onboarding catalog");
        self.catalog = StepCatalog::default();
        self.current = 0;
        self.loading = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn answers(&self) -> &OnboardingAnswers {
        &self.answers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn step_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn current_step(&self) -> Option<&Step> {
        if self.loading {
            return None;
        }
        self.catalog.step(self.current)
    }

    pub fn is_first_step(&self) -> bool {
        self.current == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.catalog.last_index() == Some(self.current)
    }

    /// Names of required fields in `step` without a valid answer.
    pub fn missing_required(&self, step: &Step) -> Vec<String> {
        step.required_fields()
            .filter(|f| !self.answers.satisfies(f))
            .map(|f| f.name.clone())
            .collect()
    }

    /// A step is complete when every required field holds a valid answer.
    pub fn is_step_complete(&self, step: &Step) -> bool {
        step.required_fields().all(|f| self.answers.satisfies(f))
    }

    pub fn is_current_step_complete(&self) -> bool {
        self.current_step()
            .is_some_and(|step| self.is_step_complete(step))
    }

    pub fn can_go_next(&self) -> bool {
        self.check_next().is_ok()
    }

    pub fn can_go_back(&self) -> bool {
        self.check_back().is_ok()
    }

    pub fn can_finish(&self) -> bool {
        self.check_finish().is_ok()
    }

    /// Record input for a field. Toggles send `Flag`, text inputs send `Text`.
    pub fn input(&mut self, name: &str, value: AnswerValue) -> Result<(), WizardError> {
        self.check_ready()?;
        debug!(field = name, "Answer updated");
        self.answers.set(name, value);
        Ok(())
    }

    /// Advance one step. Returns the new index.
    pub fn next(&mut self) -> Result<usize, WizardError> {
        self.check_next()?;
        self.current += 1;
        debug!(step = self.current, "Advanced to next step");
        Ok(self.current)
    }

    /// Go back one step. Completeness is not required. Returns the new index.
    pub fn back(&mut self) -> Result<usize, WizardError> {
        self.check_back()?;
        self.current -= 1;
        debug!(step = self.current, "Went back a step");
        Ok(self.current)
    }

    /// Leave the wizard. The answers are discarded, not submitted.
    pub fn finish(&mut self) -> Result<Redirect, WizardError> {
        self.check_finish()?;
        let discarded = std::mem::take(&mut self.answers);
        info!(
            answers = discarded.len(),
            "Onboarding finished; redirecting without submitting answers"
        );
        Ok(Redirect::home_after_onboarding())
    }

    fn check_ready(&self) -> Result<&Step, WizardError> {
        if self.loading {
            return Err(WizardError::Loading);
        }
        self.catalog.step(self.current).ok_or(WizardError::NoSteps)
    }

    fn check_complete(&self, step: &Step) -> Result<(), WizardError> {
        let missing = self.missing_required(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(WizardError::StepIncomplete {
                step: self.current,
                missing,
            })
        }
    }

    fn check_next(&self) -> Result<(), WizardError> {
        let step = self.check_ready()?;
        if self.is_last_step() {
            return Err(WizardError::AtLastStep);
        }
        self.check_complete(step)
    }

    fn check_back(&self) -> Result<(), WizardError> {
        self.check_ready()?;
        if self.is_first_step() {
            return Err(WizardError::AtFirstStep);
        }
        Ok(())
    }

    fn check_finish(&self) -> Result<(), WizardError> {
        let step = self.check_ready()?;
        if !self.is_last_step() {
            return Err(WizardError::NotLastStep);
        }
        self.check_complete(step)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::catalog::{FieldDescriptor, FieldType, default_catalog};

    /// `[[a: text, required], [b: yes-no, required]]`
    fn two_step_catalog() -> StepCatalog {
        StepCatalog::new(vec![
            Step::new(vec![FieldDescriptor::new("a", FieldType::Text).required()]),
            Step::new(vec![FieldDescriptor::new("b", FieldType::YesNo).required()]),
        ])
        .unwrap()
    }

    fn text(s: &str) -> AnswerValue {
        AnswerValue::Text(s.to_string())
    }

    struct FixedSource(Result<StepCatalog, ()>);

    #[async_trait]
    impl CatalogSource for FixedSource {
        async fn fetch_catalog(&self) -> Result<StepCatalog, FetchError> {
            self.0.clone().map_err(|_| FetchError::Status {
                url: "http://test/api/onboarding".into(),
                status: 500,
            })
        }
    }

    #[test]
    fn loading_blocks_everything() {
        let mut state = WizardState::new();
        assert!(state.is_loading());
        assert_eq!(state.input("a", text("x")), Err(WizardError::Loading));
        assert_eq!(state.next(), Err(WizardError::Loading));
        assert_eq!(state.back(), Err(WizardError::Loading));
        assert_eq!(state.finish(), Err(WizardError::Loading));
        assert!(state.answers().is_empty());
    }

    #[test]
    fn two_step_walkthrough() {
        let mut state = WizardState::with_catalog(two_step_catalog());
        assert_eq!(state.current_index(), 0);
        assert!(!state.can_go_next());
        assert_eq!(
            state.next(),
            Err(WizardError::StepIncomplete {
                step: 0,
                missing: vec!["a".into()]
            })
        );

        state.input("a", text("x")).unwrap();
        assert!(state.can_go_next());
        assert_eq!(state.next(), Ok(1));

        assert!(!state.can_finish());
        state.input("b", text("not a bool")).unwrap();
        assert!(!state.can_finish());
        state.input("b", AnswerValue::Flag(false)).unwrap();
        assert!(state.can_finish());
        assert_eq!(state.finish(), Ok(Redirect::home_after_onboarding()));
    }

    #[test]
    fn next_gated_on_each_step_of_default_catalog() {
        let mut state = WizardState::with_catalog(default_catalog());
        // Optional fields do not count.
        state.input("lastName", text("Lovelace")).unwrap();
        assert!(!state.can_go_next());
        state.input("firstName", text("Ada")).unwrap();
        assert_eq!(state.next(), Ok(1));

        state.input("country", text("UK")).unwrap();
        state.input("receiveNotifications", AnswerValue::Flag(true)).unwrap();
        assert_eq!(
            state.finish(),
            Err(WizardError::StepIncomplete {
                step: 1,
                missing: vec!["receiveUpdates".into()]
            })
        );
        state.input("receiveUpdates", AnswerValue::Flag(false)).unwrap();
        assert!(state.can_finish());
    }

    #[test]
    fn next_refused_on_last_step() {
        let mut state = WizardState::with_catalog(two_step_catalog());
        state.input("a", text("x")).unwrap();
        state.input("b", AnswerValue::Flag(true)).unwrap();
        state.next().unwrap();
        assert_eq!(state.next(), Err(WizardError::AtLastStep));
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn back_ignores_completeness_and_keeps_answers() {
        let mut state = WizardState::with_catalog(two_step_catalog());
        assert_eq!(state.back(), Err(WizardError::AtFirstStep));

        state.input("a", text("x")).unwrap();
        state.next().unwrap();
        assert!(!state.is_current_step_complete());

        let before = state.answers().clone();
        assert_eq!(state.back(), Ok(0));
        assert_eq!(state.answers(), &before);
        // Answers from step 0 survive the round trip.
        assert!(state.can_go_next());
    }

    #[test]
    fn finish_only_on_last_step() {
        let mut state = WizardState::with_catalog(two_step_catalog());
        state.input("a", text("x")).unwrap();
        state.input("b", AnswerValue::Flag(true)).unwrap();
        assert_eq!(state.finish(), Err(WizardError::NotLastStep));

        state.next().unwrap();
        let redirect = state.finish().unwrap();
        assert_eq!(redirect.target, HOME_ROUTE);
        assert!(redirect.state.onboarding);
        assert!(state.answers().is_empty(), "answers are discarded on finish");
    }

    #[test]
    fn single_step_catalog_finishes_directly() {
        let catalog =
            StepCatalog::new(vec![Step::new(vec![FieldDescriptor::new("a", FieldType::Text)])])
                .unwrap();
        let mut state = WizardState::with_catalog(catalog);
        assert!(!state.can_go_next());
        assert!(!state.can_go_back());
        assert!(state.can_finish());
    }

    #[test]
    fn index_stays_in_bounds() {
        let mut state = WizardState::with_catalog(two_step_catalog());
        state.input("a", text("x")).unwrap();
        for _ in 0..5 {
            let _ = state.next();
            assert!(state.current_index() < state.step_count());
        }
        for _ in 0..5 {
            let _ = state.back();
            assert!(state.current_index() < state.step_count());
        }
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn required_unknown_type_blocks_progress() {
        let catalog = StepCatalog::new(vec![
            Step::new(vec![
                FieldDescriptor::new("when", FieldType::Unknown("date".into())).required(),
            ]),
            Step::default(),
        ])
        .unwrap();
        let mut state = WizardState::with_catalog(catalog);
        state.input("when", text("2024-01-01")).unwrap();
        assert!(!state.can_go_next());
    }

    #[tokio::test]
    async fn load_success() {
        let state = WizardState::load(&FixedSource(Ok(two_step_catalog()))).await;
        assert!(!state.is_loading());
        assert_eq!(state.step_count(), 2);
        assert_eq!(state.current_index(), 0);
    }

    #[tokio::test]
    async fn load_failure_leaves_empty_wizard() {
        let mut state = WizardState::load(&FixedSource(Err(()))).await;
        assert!(!state.is_loading());
        assert_eq!(state.step_count(), 0);
        assert!(state.error().is_none());
        assert_eq!(state.next(), Err(WizardError::NoSteps));
        assert_eq!(state.input("a", text("x")), Err(WizardError::NoSteps));
    }
}
