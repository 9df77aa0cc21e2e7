//! User repository for database operations.
//!
//! Pool-level reads and creation live on [`UserRepository`]. Mutations that
//! can change the number of active admins are exposed only as
//! connection-level functions so they run inside the admin guard's
//! transaction (see `services::admin_guard`).

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use sitedesk_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

/// Advisory lock key serializing every mutation that can remove an admin.
///
/// The bytes spell `SDADMMUT`; any constant works as long as all guarded
/// paths use the same one.
pub const ADMIN_MUTATION_LOCK_KEY: i64 = 0x5344_4144_4d4d_5554;

const USER_COLUMNS: &str = "id, email, name, role, is_active, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `cms.app_user` queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: String,
    role: UserRole,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

/// Field updates for a user. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<Email>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    /// Whether applying these changes would stop `user` counting as an active admin.
    #[must_use]
    pub fn removes_admin(&self, user: &User) -> bool {
        user.is_active_admin()
            && (self.role.is_some_and(|role| !role.is_admin()) || self.is_active == Some(false))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM cms.app_user ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM cms.app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user and their stored password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM cms.app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| User::try_from(r.user).map(|user| (user, r.password_hash)))
            .transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: UserRole,
        password_hash: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO cms.app_user (email, name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(email)
        .bind(name)
        .bind(role)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "email already exists"))?;

        row.try_into()
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cms.app_user SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count users holding the admin role who are active.
    ///
    /// Advisory only; guarded mutations recount under the lock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active_admins(&self) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        count_active_admins(&mut conn).await
    }
}

// =============================================================================
// Transaction-scoped operations
// =============================================================================

/// Take the admin-mutation advisory lock for the rest of the transaction.
///
/// Must be called on a connection inside an open transaction; the lock is
/// released on commit or rollback.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the statement fails.
pub async fn lock_admin_mutations(conn: &mut PgConnection) -> Result<(), RepositoryError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ADMIN_MUTATION_LOCK_KEY)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Load a user and lock the row until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if the data is invalid.
pub async fn find_for_update(
    conn: &mut PgConnection,
    id: UserId,
) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM cms.app_user WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(TryInto::try_into).transpose()
}

/// Count active admins as seen by this connection.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn count_active_admins(conn: &mut PgConnection) -> Result<i64, RepositoryError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM cms.app_user WHERE role = 'admin' AND is_active",
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// Apply field changes to a user.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
/// Returns `RepositoryError::Conflict` if the new email is taken.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn apply_changes(
    conn: &mut PgConnection,
    id: UserId,
    changes: &UserChanges,
) -> Result<User, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r"
        UPDATE cms.app_user
        SET email = COALESCE($2, email),
            name = COALESCE($3, name),
            role = COALESCE($4, role),
            is_active = COALESCE($5, is_active)
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "
    ))
    .bind(id)
    .bind(changes.email.as_ref())
    .bind(changes.name.as_deref())
    .bind(changes.role)
    .bind(changes.is_active)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_unique_violation(e, "email already exists"))?
    .ok_or(RepositoryError::NotFound)?;

    row.try_into()
}

/// Delete a user row.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn delete(conn: &mut PgConnection, id: UserId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM cms.app_user WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(role: UserRole, is_active: bool) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("a@example.com").unwrap(),
            name: "A".to_owned(),
            role,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn removes_admin_on_demotion_or_deactivation() {
        let admin = user(UserRole::Admin, true);
        let demote = UserChanges {
            role: Some(UserRole::Editor),
            ..UserChanges::default()
        };
        let deactivate = UserChanges {
            is_active: Some(false),
            ..UserChanges::default()
        };
        assert!(demote.removes_admin(&admin));
        assert!(deactivate.removes_admin(&admin));
    }

    #[test]
    fn harmless_changes_do_not_remove_admin() {
        let admin = user(UserRole::Admin, true);
        let rename = UserChanges {
            name: Some("B".to_owned()),
            role: Some(UserRole::Admin),
            is_active: Some(true),
            ..UserChanges::default()
        };
        assert!(!rename.removes_admin(&admin));

        let inactive_admin = user(UserRole::Admin, false);
        let demote = UserChanges {
            role: Some(UserRole::Viewer),
            ..UserChanges::default()
        };
        assert!(!demote.removes_admin(&inactive_admin));
        assert!(!demote.removes_admin(&user(UserRole::Editor, true)));
    }

    #[test]
    fn lock_key_is_positive_and_stable() {
        assert!(ADMIN_MUTATION_LOCK_KEY > 0);
        assert_eq!(&ADMIN_MUTATION_LOCK_KEY.to_be_bytes(), b"SDADMMUT");
    }
}
