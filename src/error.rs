//! Error types for Onboard Form.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Methods served on the onboarding resource, as advertised in `Allow`.
pub const ALLOWED_METHODS: &str = "GET, POST";

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid step catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Step catalog construction errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Field {position} of step {step} has an empty name")]
    EmptyName { step: usize, position: usize },

    #[error("Field name {name:?} appears more than once in step {step}")]
    DuplicateField { step: usize, name: String },
}

/// Errors surfaced by the onboarding HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // No body: nothing about the resource leaks to anonymous callers.
            Self::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            Self::MalformedInput(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, ALLOWED_METHODS)],
            )
                .into_response(),
            Self::Internal(reason) => {
                tracing::error!(reason = %reason, "Unhandled server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Catalog fetch failures on the client side.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Server at {url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Could not decode catalog from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Rejected wizard transitions. The wizard state is unchanged when one of
/// these is returned.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("The step catalog is still loading")]
    Loading,

    #[error("No onboarding steps are available")]
    NoSteps,

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Finish is only available on the last step")]
    NotLastStep,

    #[error("Step {step} is missing required fields: {}", .missing.join(", "))]
    StepIncomplete { step: usize, missing: Vec<String> },
}
