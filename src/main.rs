use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;

use onboard_form::catalog::{self, StepCatalog};
use onboard_form::config::ServerConfig;
use onboard_form::onboarding::{OnboardingRouteState, onboarding_routes};
use onboard_form::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("reading ONBOARDING_* configuration")?;
    let addr = config.socket_addr()?;

    // ── Catalog ──────────────────────────────────────────────────────────
    let step_catalog: StepCatalog = match config.catalog_path {
        Some(ref path) => catalog::load_catalog(path)
            .await
            .with_context(|| format!("loading step catalog from {}", path.display()))?,
        None => catalog::default_catalog(),
    };

    eprintln!("📝 Onboard Form v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Catalog: {} ({} steps)",
        config
            .catalog_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        step_catalog.len()
    );
    eprintln!("   Sessions: {} configured", config.sessions.len());
    eprintln!("   API: http://{}/api/onboarding\n", addr);

    if config.sessions.is_empty() {
        tracing::warn!("No sessions configured; every onboarding request will be rejected with 401");
    }

    // ── HTTP ─────────────────────────────────────────────────────────────
    let sessions: Arc<dyn SessionStore> = Arc::new(config.sessions.clone());
    let state = OnboardingRouteState::new(step_catalog, &config.photo_url);
    let app = onboarding_routes(state, sessions).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
