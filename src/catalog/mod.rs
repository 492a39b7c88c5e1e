//! Step catalog: the ordered, immutable list of onboarding steps.
//!
//! The catalog is built once at startup (from the built-in definition or a
//! JSON file) and shared read-only by every request.

pub mod builtin;
pub mod model;

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub use builtin::default_catalog;
pub use model::{CatalogResponse, FieldDescriptor, FieldType, Step, StepCatalog};

/// Accepted catalog file layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Envelope { steps: StepCatalog },
    Bare(StepCatalog),
}

/// Parse a catalog from JSON, either `{"steps": [...]}` or a bare array of
/// steps.
pub fn parse_catalog(json: &str) -> Result<StepCatalog, ConfigError> {
    let file: CatalogFile =
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let catalog = match file {
        CatalogFile::Envelope { steps } => steps,
        CatalogFile::Bare(steps) => steps,
    };
    catalog.validate()?;
    Ok(catalog)
}

/// Load and validate a catalog file.
pub async fn load_catalog(path: &Path) -> Result<StepCatalog, ConfigError> {
    let json = tokio::fs::read_to_string(path).await?;
    let catalog = parse_catalog(&json)?;
    tracing::info!(
        path = %path.display(),
        steps = catalog.len(),
        "Loaded step catalog from file"
    );
    Ok(catalog)
}
