//! REST endpoints for the onboarding step catalog and submissions.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{info, warn};

use super::model::{FlatSubmission, INVALID_BODY_MESSAGE, UserRecord};
use crate::catalog::{CatalogResponse, StepCatalog};
use crate::error::ApiError;
use crate::session::{CurrentUser, SessionStore, resolve_session};

/// Path of the onboarding resource.
pub const ONBOARDING_PATH: &str = "/api/onboarding";

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    /// Built once at startup, read-only afterwards.
    pub catalog: Arc<StepCatalog>,
    /// Photo URL reported in echoed user records.
    pub photo_url: Arc<str>,
}

impl OnboardingRouteState {
    pub fn new(catalog: StepCatalog, photo_url: &str) -> Self {
        Self {
            catalog: Arc::new(catalog),
            photo_url: Arc::from(photo_url),
        }
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "onboard-form"
    }))
}

/// GET /api/onboarding
///
/// Returns the full step catalog, in fixed order.
async fn get_catalog(
    CurrentUser(user): CurrentUser,
    State(state): State<OnboardingRouteState>,
) -> Result<Json<CatalogResponse>, ApiError> {
    info!(user_id = user.id, steps = state.catalog.len(), "Serving step catalog");
    Ok(Json(CatalogResponse {
        steps: state.catalog.as_ref().clone(),
    }))
}

/// POST /api/onboarding
///
/// Flattens the submitted steps and echoes them back as a user record.
/// Nothing is persisted, and required-ness and types are not checked.
async fn save_onboarding(
    CurrentUser(user): CurrentUser,
    State(state): State<OnboardingRouteState>,
    body: Bytes,
) -> Result<Json<UserRecord>, ApiError> {
    let body: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::MalformedInput(INVALID_BODY_MESSAGE.to_string()))?;
    let submission = FlatSubmission::from_body(&body)?;

    warn!(
        user_id = user.id,
        fields = submission.len(),
        "Onboarding submission echoed without validation or persistence"
    );

    Ok(Json(UserRecord::from_submission(
        &user,
        &submission,
        &state.photo_url,
        chrono::Utc::now(),
    )))
}

/// Any other method on /api/onboarding.
async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Turn a handler panic into a generic 500.
fn handle_panic(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(detail).into_response()
}

/// Build the onboarding REST routes.
///
/// The session layer only wraps the onboarding resource; `/health` stays
/// public.
pub fn onboarding_routes(state: OnboardingRouteState, sessions: Arc<dyn SessionStore>) -> Router {
    Router::new()
        .route(
            ONBOARDING_PATH,
            get(get_catalog)
                .post(save_onboarding)
                .fallback(method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(sessions, resolve_session))
        .route("/health", get(health))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
}
