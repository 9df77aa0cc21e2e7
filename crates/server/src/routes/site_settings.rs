//! Site settings API.
//!
//! Reads are public; writes require an admin. Both write endpoints upsert,
//! so a client that `PUT`s a key that does not exist yet creates it.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sitedesk_core::{SettingKey, SettingType};

use crate::db::{RepositoryError, SettingsRepository};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::Setting;
use crate::services::SettingsService;
use crate::state::AppState;

/// Build the site settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/site-settings", get(list_settings).post(create_setting))
        .route(
            "/api/site-settings/{key}",
            get(get_setting).put(update_setting),
        )
}

// =============================================================================
// API Types
// =============================================================================

/// A setting as returned by the API.
#[derive(Debug, Serialize)]
pub struct SettingView {
    pub id: i32,
    pub setting_key: String,
    pub setting_value: String,
    pub setting_type: SettingType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Setting> for SettingView {
    fn from(setting: Setting) -> Self {
        Self {
            id: setting.id.as_i32(),
            setting_key: setting.key.into(),
            setting_value: setting.value,
            setting_type: setting.setting_type,
            created_at: setting.created_at,
            updated_at: setting.updated_at,
        }
    }
}

/// Body of `POST /api/site-settings`.
#[derive(Debug, Deserialize)]
pub struct CreateSettingRequest {
    pub setting_key: String,
    pub setting_value: String,
    #[serde(default)]
    pub setting_type: SettingType,
}

/// Body of `PUT /api/site-settings/{key}`.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub setting_value: String,
    #[serde(default)]
    pub setting_type: SettingType,
}

// =============================================================================
// Handlers
// =============================================================================

/// List every setting, ordered by key.
///
/// GET /api/site-settings
#[instrument(skip(state))]
async fn list_settings(State(state): State<AppState>) -> Result<Json<Vec<SettingView>>, AppError> {
    let settings = SettingsRepository::new(state.pool()).list_all().await?;
    Ok(Json(settings.into_iter().map(SettingView::from).collect()))
}

/// Get one setting.
///
/// GET /api/site-settings/{key}
#[instrument(skip(state))]
async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SettingView>, AppError> {
    // A key that can never be stored cannot exist.
    let Ok(key) = SettingKey::parse(&key) else {
        return Err(setting_not_found());
    };

    SettingsRepository::new(state.pool())
        .get_by_key(&key)
        .await
        .map(|setting| Json(setting.into()))
        .map_err(|e| match e {
            RepositoryError::NotFound => setting_not_found(),
            other => other.into(),
        })
}

/// Create or update a setting.
///
/// POST /api/site-settings
#[instrument(skip(state, req), fields(key = %req.setting_key))]
async fn create_setting(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreateSettingRequest>,
) -> Result<Json<SettingView>, AppError> {
    let setting = SettingsService::new(state.pool())
        .upsert(&req.setting_key, &req.setting_value, req.setting_type)
        .await?;

    tracing::info!(key = %setting.key, user_id = %admin.id, "setting saved");
    Ok(Json(setting.into()))
}

/// Create or update the setting named in the path.
///
/// PUT /api/site-settings/{key}
#[instrument(skip(state, req))]
async fn update_setting(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<SettingView>, AppError> {
    let setting = SettingsService::new(state.pool())
        .upsert(&key, &req.setting_value, req.setting_type)
        .await?;

    tracing::info!(key = %setting.key, user_id = %admin.id, "setting saved");
    Ok(Json(setting.into()))
}

fn setting_not_found() -> AppError {
    AppError::NotFound("Setting not found".to_string())
}
