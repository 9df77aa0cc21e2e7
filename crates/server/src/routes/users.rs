//! User administration API (admin only).
//!
//! Updates and deletes go through [`AdminGuard`], which refuses anything
//! that would leave the site without an active admin.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sitedesk_core::{Email, UserId, UserRole};

use crate::db::{UserChanges, UserRepository};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::{AdminGuard, AuthService, hash_password};
use crate::state::AppState;

/// Maximum display name length.
const MAX_NAME_LENGTH: usize = 100;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/{id}/password", put(set_password))
}

// =============================================================================
// API Types
// =============================================================================

/// A user as returned by the API.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i32(),
            email: user.email.into_inner(),
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body of `POST /api/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
    /// Initial password; without one the user cannot log in yet.
    pub password: Option<String>,
}

const fn default_role() -> UserRole {
    UserRole::Viewer
}

/// Body of `PUT /api/users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    fn into_changes(self) -> Result<UserChanges, AppError> {
        Ok(UserChanges {
            email: self.email.as_deref().map(parse_email).transpose()?,
            name: self.name.as_deref().map(validate_name).transpose()?,
            role: self.role,
            is_active: self.is_active,
        })
    }
}

/// Body of `PUT /api/users/{id}/password`.
#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

impl std::fmt::Debug for SetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetPasswordRequest")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List all users.
///
/// GET /api/users
#[instrument(skip(state, _admin))]
async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserView>>, AppError> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// Get one user.
///
/// GET /api/users/{id}
#[instrument(skip(state, _admin))]
async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<UserView>, AppError> {
    UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .map(|user| Json(user.into()))
        .ok_or_else(user_not_found)
}

/// Create a user.
///
/// POST /api/users
#[instrument(skip(state, req), fields(email = %req.email))]
async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let email = parse_email(&req.email)?;
    let name = validate_name(&req.name)?;
    let password_hash = req.password.as_deref().map(hash_password).transpose()?;

    let user = UserRepository::new(state.pool())
        .create(&email, &name, req.role, password_hash.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, created_by = %admin.id, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Update a user, subject to the last-admin guard.
///
/// PUT /api/users/{id}
#[instrument(skip(state, req))]
async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, AppError> {
    let changes = req.into_changes()?;
    let user = AdminGuard::new(state.pool())
        .update_user(UserId::new(id), &changes)
        .await?;
    Ok(Json(user.into()))
}

/// Delete a user, subject to the self-delete and last-admin guards.
///
/// DELETE /api/users/{id}
#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    AdminGuard::new(state.pool())
        .delete_user(admin.id, UserId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set or replace a user's password.
///
/// PUT /api/users/{id}/password
#[instrument(skip(state, req))]
async fn set_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(req): Json<SetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    AuthService::new(state.pool())
        .set_password(UserId::new(id), &req.password)
        .await?;
    tracing::info!(user_id = id, set_by = %admin.id, "password changed by admin");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Validation
// =============================================================================

fn parse_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid email: {e}")))
}

fn validate_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_validates_fields() {
        let req = UpdateUserRequest {
            email: Some(" Admin@Example.com ".to_string()),
            name: Some("  Ada  ".to_string()),
            ..UpdateUserRequest::default()
        };
        let changes = req.into_changes().unwrap();
        assert_eq!(changes.email.unwrap().as_str(), "admin@example.com");
        assert_eq!(changes.name.as_deref(), Some("Ada"));
        assert_eq!(changes.role, None);
    }

    #[test]
    fn test_update_request_rejects_blank_name() {
        let req = UpdateUserRequest {
            name: Some("   ".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(matches!(req.into_changes(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_create_request_defaults_to_viewer() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"email":"a@example.com","name":"A"}"#).unwrap();
        assert_eq!(req.role, UserRole::Viewer);
        assert!(req.password.is_none());
    }
}
