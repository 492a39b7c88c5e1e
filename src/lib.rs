//! Onboard Form: multi-step onboarding catalog service and wizard.

pub mod catalog;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod session;
pub mod wizard;
