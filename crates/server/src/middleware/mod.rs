//! HTTP middleware and extractors.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry layers (capture errors and transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. CORS (only when origins are configured)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Console guard (only on `/admin`, redirects to login)
//!
//! API handlers authenticate with the [`RequireUser`] and [`RequireAdmin`]
//! extractors instead of a layer.

pub mod auth;
pub mod route_guard;
pub mod session;

pub use auth::{
    AuthRejection, RequireAdmin, RequireUser, clear_current_user, refresh_current_user,
    set_current_user,
};
pub use route_guard::{guard_console, take_destination};
pub use session::{
    SESSION_COOKIE_NAME, SessionStoreError, create_session_layer, create_session_store,
};
