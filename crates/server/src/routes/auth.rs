//! Login, logout and identity lookup.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user};
use crate::middleware::{RequireUser, clear_current_user, set_current_user, take_destination};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Body of `POST /api/auth/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: CurrentUser,
    /// Where the console should navigate next.
    pub redirect_to: String,
}

/// Verify credentials and start a session.
///
/// POST /api/auth/login
#[instrument(skip(state, session, req), fields(email = %req.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = AuthService::new(state.pool())
        .login(&req.email, &req.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "login refused"))?;

    // New session ID on privilege change; data (including `return_to`) carries over.
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session cycle failed: {e}")))?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await?;
    let redirect_to = take_destination(&session, state.route_guard()).await;

    tracing::info!(user_id = %current.id, role = %current.role, "login succeeded");
    Ok(Json(LoginResponse {
        user: current,
        redirect_to,
    }))
}

/// End the session's identity.
///
/// POST /api/auth/logout
#[instrument(skip(session))]
async fn logout(session: Session) -> StatusCode {
    clear_current_user(&session).await;
    clear_sentry_user();
    StatusCode::NO_CONTENT
}

/// The signed-in user.
///
/// GET /api/auth/me
async fn me(RequireUser(user): RequireUser) -> Json<CurrentUser> {
    Json(user)
}
