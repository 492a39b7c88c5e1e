//! Catalog fetching for the wizard.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::catalog::{CatalogResponse, StepCatalog};
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::onboarding::ONBOARDING_PATH;

/// Where the wizard gets its steps from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<StepCatalog, FetchError>;
}

/// HTTP client for `GET /api/onboarding`.
///
/// One request, no retry, no timeout.
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    session_token: Option<SecretString>,
}

impl CatalogClient {
    pub fn new(base_url: &str, session_token: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_url, config.session_token.clone())
    }

    pub fn catalog_url(&self) -> String {
        format!("{}{ONBOARDING_PATH}", self.base_url)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_catalog(&self) -> Result<StepCatalog, FetchError> {
        let url = self.catalog_url();
        debug!(url = %url, "Fetching onboarding catalog");

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.session_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await.map_err(|e| FetchError::Request {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let body: CatalogResponse = resp.json().await.map_err(|e| FetchError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok(body.steps)
    }
}
