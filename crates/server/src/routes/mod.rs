//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness
//! GET    /health/ready                - Readiness (database reachable)
//!
//! # Site settings (reads public, writes admin)
//! GET    /api/site-settings           - List all settings
//! POST   /api/site-settings           - Upsert a setting
//! GET    /api/site-settings/{key}     - Get one setting
//! PUT    /api/site-settings/{key}     - Upsert the named setting
//!
//! # Decoded configuration (public)
//! GET    /api/site-config             - Every section
//! GET    /api/site-config/{namespace} - One section with fallbacks
//!
//! # Users (admin)
//! GET    /api/users                   - List users
//! POST   /api/users                   - Create user
//! GET    /api/users/{id}              - Get user
//! PUT    /api/users/{id}              - Update user (last-admin guard)
//! DELETE /api/users/{id}              - Delete user (self/last-admin guard)
//! PUT    /api/users/{id}/password     - Set user password
//!
//! # Auth
//! POST   /api/auth/login              - Password login
//! POST   /api/auth/logout             - End session identity
//! GET    /api/auth/me                 - Current identity
//! ```

pub mod auth;
pub mod health;
pub mod site_config;
pub mod site_settings;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(site_settings::router())
        .merge(site_config::router())
        .merge(users::router())
        .merge(auth::router())
}
