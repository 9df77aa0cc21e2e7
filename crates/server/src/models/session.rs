//! Session-stored identity.

use serde::{Deserialize, Serialize};

use sitedesk_core::{Email, SessionState, UserId, UserRole};

use super::User;

/// The signed-in user, as stored in the session.
///
/// Created by login, read by every guarded request, removed by logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's display name.
    pub name: String,
    /// Role at login time.
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether the session holds admin rights.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Route guard view of an optional identity.
    #[must_use]
    pub fn session_state(identity: Option<&Self>) -> SessionState {
        identity.map_or(SessionState::Anonymous, |user| SessionState::Authenticated {
            is_admin: user.is_admin(),
        })
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Console path remembered by the route guard for after login.
    ///
    /// Kept apart from `CURRENT_USER` so logout does not discard it.
    pub const RETURN_TO: &str = "return_to";
}
