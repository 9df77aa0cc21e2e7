//! CMS user domain type.

use chrono::{DateTime, Utc};

use sitedesk_core::{Email, UserId, UserRole};

/// A CMS user (domain type).
///
/// The password hash is deliberately absent; only the auth service reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email (normalized to lowercase).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Permission level.
    pub role: UserRole,
    /// Inactive users cannot sign in and do not count as admins.
    pub is_active: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user currently counts toward the active-admin total.
    #[must_use]
    pub const fn is_active_admin(&self) -> bool {
        self.role.is_admin() && self.is_active
    }
}
