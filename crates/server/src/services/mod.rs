//! Business logic services.
//!
//! # Services
//!
//! - `admin_guard` - Last-admin and self-delete protection for user mutations
//! - `auth` - Argon2 password authentication
//! - `settings` - Validated setting writes shared by the API and CLI

pub mod admin_guard;
pub mod auth;
pub mod settings;

pub use admin_guard::{AdminGuard, AdminGuardError, GuardedAction, Violation};
pub use auth::{AuthError, AuthService, hash_password};
pub use settings::{SettingsError, SettingsService};
