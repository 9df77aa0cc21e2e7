//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use sitedesk_core::RouteGuard;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds no mutable state; all coordination
/// between requests happens in the database.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    route_guard: RouteGuard,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let route_guard = config.route_guard();
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                route_guard,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the admin console navigation guard.
    #[must_use]
    pub fn route_guard(&self) -> &RouteGuard {
        &self.inner.route_guard
    }
}
