//! Onboarding service: serves the step catalog and echoes submissions.
//!
//! The catalog is read-only and process-wide. Submissions are flattened into
//! a single field map and returned as a synthesized user record; nothing is
//! written anywhere.

pub mod model;
pub mod routes;

pub use model::{FlatSubmission, UserRecord};
pub use routes::{ONBOARDING_PATH, OnboardingRouteState, onboarding_routes};
