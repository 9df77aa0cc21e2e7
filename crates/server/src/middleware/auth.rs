//! Authentication extractors for API handlers.
//!
//! The session only carries the identity captured at login. Every guarded
//! request re-reads the user row, so a deactivated or demoted user loses
//! access on their next request rather than when the session expires.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires any signed-in, active user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a signed-in, active admin.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when an extractor refuses the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// No valid session.
    Unauthorized,
    /// Signed in, but not an admin.
    Forbidden,
    /// The identity could not be checked.
    Internal(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            }
            Self::Forbidden => {
                AppError::Forbidden("Admin access required".to_string()).into_response()
            }
            Self::Internal(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        load_current_user(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = load_current_user(parts, state).await?;
        if !user.is_admin() {
            tracing::info!(user_id = %user.id, path = %parts.uri.path(), "admin access refused");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

async fn load_current_user(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let current = refresh_current_user(session, state)
        .await
        .map_err(AuthRejection::Internal)?
        .ok_or(AuthRejection::Unauthorized)?;

    set_sentry_user(current.id.as_i32(), Some(current.email.as_str()));
    Ok(current)
}

/// The session's identity, checked against the current user row.
///
/// Returns `None` for an anonymous session. A user that was deleted or
/// deactivated since login is cleared from the session and also yields
/// `None`; a changed role, name or email replaces the stored copy.
///
/// # Errors
///
/// Returns `AppError` if the user row cannot be read or the session
/// cannot be written.
pub async fn refresh_current_user(
    session: &Session,
    state: &AppState,
) -> Result<Option<CurrentUser>, AppError> {
    let stored: Option<CurrentUser> = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();
    let Some(stored) = stored else {
        return Ok(None);
    };

    let user = UserRepository::new(state.pool())
        .get_by_id(stored.id)
        .await?;

    let Some(user) = user.filter(|u| u.is_active) else {
        tracing::info!(user_id = %stored.id, "session user missing or inactive");
        clear_current_user(session).await;
        return Ok(None);
    };

    let current = CurrentUser::from(&user);
    if current != stored {
        set_current_user(session, &current).await?;
    }
    Ok(Some(current))
}

/// Store the signed-in user in the session.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session cannot be written.
pub async fn set_current_user(session: &Session, user: &CurrentUser) -> Result<(), AppError> {
    session
        .insert(session_keys::CURRENT_USER, user)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))
}

/// Remove the signed-in user, keeping any remembered console path.
pub async fn clear_current_user(session: &Session) {
    if let Err(e) = session.remove_value(session_keys::CURRENT_USER).await {
        tracing::warn!(error = %e, "failed to clear session user");
    }
}
