//! Sitedesk server library.
//!
//! The REST API behind the sitedesk admin console: flat site settings,
//! typed site configuration decoded from them, and user administration
//! guarded so the site always keeps an active admin.
//!
//! The binary in `main.rs` wires configuration, logging and the listener
//! around [`app`]; tests build the same router with an in-memory session
//! store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod site_config;
pub mod state;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::config::ServerConfig;
use crate::middleware::{create_session_layer, guard_console};
use crate::state::AppState;

/// Build the complete application router.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config();
    let session_layer = create_session_layer(session_store, config);
    let cors = cors_layer(config);

    let router = Router::new()
        .merge(routes::routes())
        .merge(console_routes(&state))
        .layer(session_layer);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// The built admin console under `/admin`, behind the login redirect.
///
/// `/login` serves the console's entry point so the console can render its
/// own login screen.
fn console_routes(state: &AppState) -> Router<AppState> {
    let dir = &state.config().console_dir;
    let index = dir.join("index.html");

    let console = ServeDir::new(dir).fallback(ServeFile::new(&index));

    Router::new()
        .nest_service("/admin", console)
        .layer(from_fn_with_state(state.clone(), guard_console))
        .route_service("/login", ServeFile::new(index))
}

/// CORS for the configured console origins, if any.
fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}
