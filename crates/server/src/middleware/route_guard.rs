//! Login redirect for admin console pages.
//!
//! Applied to the static console under `/admin`. A visitor without an admin
//! session is sent to the login page with `303 See Other`, and the page they
//! asked for is stored under `return_to` so the next successful login can
//! send them back exactly once.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use sitedesk_core::{GuardDecision, PendingRedirect, RouteGuard};

use super::auth::refresh_current_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Gate a console request on the session's identity.
///
/// The identity is re-read from the user table, so a demoted or deactivated
/// admin is sent to the login page on their next console request.
pub async fn guard_console(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let current = match refresh_current_user(&session, &state).await {
        Ok(current) => current,
        Err(e) => return e.into_response(),
    };

    let requested = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), ToString::to_string);

    let decision = state
        .route_guard()
        .check(CurrentUser::session_state(current.as_ref()), &requested);

    match decision {
        GuardDecision::Allow => next.run(request).await,
        // Session reads complete before the check, so this only happens if a
        // caller passes `Loading` explicitly.
        GuardDecision::Wait => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
            response
        }
        GuardDecision::RedirectToLogin { ref login_path, .. } => {
            remember_destination(&session, &decision).await;
            tracing::debug!(path = %requested, "console request redirected to login");
            Redirect::to(login_path).into_response()
        }
    }
}

async fn remember_destination(session: &Session, decision: &GuardDecision) {
    let mut pending: PendingRedirect = session
        .get(session_keys::RETURN_TO)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    RouteGuard::record(decision, &mut pending);

    if let Err(e) = session.insert(session_keys::RETURN_TO, &pending).await {
        tracing::warn!(error = %e, "failed to remember console destination");
    }
}

/// Consume the remembered destination for a fresh login.
///
/// Falls back to the guard's landing page when nothing usable is stored.
pub async fn take_destination(session: &Session, guard: &RouteGuard) -> String {
    let mut pending: PendingRedirect = session
        .remove(session_keys::RETURN_TO)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    guard.after_login(&mut pending)
}
