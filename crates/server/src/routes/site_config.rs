//! Decoded site configuration for public pages.
//!
//! Rebuilt from the settings table on every request. A corrupt setting
//! never fails the request; it is reported in `fallbacks` and the section
//! default is served in its place.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::AppError;
use crate::site_config::{FieldFallback, Namespace, SectionConfig, SiteConfig};
use crate::state::AppState;

/// Build the site config router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/site-config", get(full_config))
        .route("/api/site-config/{namespace}", get(section_config))
}

/// A field served from its default, as reported to clients.
#[derive(Debug, Serialize)]
pub struct FallbackView {
    pub field: String,
    pub reason: String,
}

impl From<FieldFallback> for FallbackView {
    fn from(fallback: FieldFallback) -> Self {
        Self {
            field: fallback.field,
            reason: fallback.reason.to_string(),
        }
    }
}

/// One section with its fallbacks.
#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub namespace: Namespace,
    pub config: SectionConfig,
    pub fallbacks: Vec<FallbackView>,
}

/// Every section at once.
///
/// GET /api/site-config
#[instrument(skip(state))]
async fn full_config(State(state): State<AppState>) -> Result<Json<SiteConfig>, AppError> {
    let settings = SettingsRepository::new(state.pool()).list_all().await?;
    let (config, fallbacks) = SiteConfig::from_settings(&settings);
    if !fallbacks.is_empty() {
        tracing::debug!(count = fallbacks.len(), "site config served with fallbacks");
    }
    Ok(Json(config))
}

/// One section by namespace name.
///
/// GET /api/site-config/{namespace}
#[instrument(skip(state))]
async fn section_config(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<SectionResponse>, AppError> {
    let namespace: Namespace = namespace
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown settings namespace: {namespace}")))?;

    let settings = SettingsRepository::new(state.pool()).list_all().await?;
    let section = SectionConfig::load(namespace, &settings);

    Ok(Json(SectionResponse {
        namespace,
        config: section.value,
        fallbacks: section.fallbacks.into_iter().map(FallbackView::from).collect(),
    }))
}
