//! User roles.

use serde::{Deserialize, Serialize};

/// Permission level of a CMS user.
///
/// Only `Admin` may manage users and site settings; the admin safety guard
/// keeps at least one active `Admin` in existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "cms.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including user administration and settings.
    Admin,
    /// Can edit site content.
    Editor,
    /// Read-only access.
    Viewer,
}

impl UserRole {
    /// Whether this role grants administrator access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Editor => write!(f, "editor"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        for role in [UserRole::Admin, UserRole::Editor, UserRole::Viewer] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("super_admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn only_admin_is_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Editor.is_admin());
        assert!(!UserRole::Viewer.is_admin());
    }
}
