//! Protection against removing the last active admin.
//!
//! Every guarded mutation runs as one transaction:
//!
//! 1. take the admin-mutation advisory lock
//! 2. load the target row `FOR UPDATE`
//! 3. count active admins
//! 4. [`evaluate_update`] / [`evaluate_delete`]
//! 5. mutate and commit
//!
//! Because all guarded paths hold the same lock from step 1 until commit,
//! two requests each removing one of two admins cannot both observe a count
//! of two.

use sqlx::PgPool;
use thiserror::Error;

use sitedesk_core::UserId;

use crate::db::RepositoryError;
use crate::db::users::{self, UserChanges};
use crate::models::User;

/// A mutation the guard can refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    Deactivate,
    Demote,
    Delete,
}

/// Why a mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("You cannot delete your own account")]
    SelfDelete,

    #[error("{}", last_admin_message(.0))]
    LastActiveAdmin(GuardedAction),
}

const fn last_admin_message(action: &GuardedAction) -> &'static str {
    match action {
        GuardedAction::Deactivate => {
            "Cannot deactivate the last active admin. Promote another user to admin first."
        }
        GuardedAction::Demote => {
            "Cannot remove the admin role from the last active admin. Promote another user to admin first."
        }
        GuardedAction::Delete => {
            "Cannot delete the last active admin. Promote another user to admin first."
        }
    }
}

/// Errors from guarded user mutations.
#[derive(Debug, Error)]
pub enum AdminGuardError {
    /// The mutation would break an admin invariant.
    #[error(transparent)]
    Violation(#[from] Violation),

    /// The target user does not exist.
    #[error("user not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for AdminGuardError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Decide whether `changes` may be applied to `target`.
///
/// `active_admins` must include `target` if it is currently an active admin.
///
/// # Errors
///
/// Returns `Violation::LastActiveAdmin` if the change would leave no active admin.
pub fn evaluate_update(
    target: &User,
    changes: &UserChanges,
    active_admins: i64,
) -> Result<(), Violation> {
    if !changes.removes_admin(target) || active_admins > 1 {
        return Ok(());
    }
    let action = if changes.is_active == Some(false) {
        GuardedAction::Deactivate
    } else {
        GuardedAction::Demote
    };
    Err(Violation::LastActiveAdmin(action))
}

/// Decide whether `requester` may delete `target`.
///
/// # Errors
///
/// Returns `Violation::SelfDelete` if the requester is the target.
/// Returns `Violation::LastActiveAdmin` if the target is the last active admin.
pub fn evaluate_delete(
    requester: UserId,
    target: &User,
    active_admins: i64,
) -> Result<(), Violation> {
    if requester == target.id {
        return Err(Violation::SelfDelete);
    }
    if target.is_active_admin() && active_admins <= 1 {
        return Err(Violation::LastActiveAdmin(GuardedAction::Delete));
    }
    Ok(())
}

/// Runs user mutations under the admin invariants.
pub struct AdminGuard<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminGuard<'a> {
    /// Create a new guard over the pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Update a user unless doing so would leave no active admin.
    ///
    /// # Errors
    ///
    /// Returns `AdminGuardError::Violation` if the change is refused.
    /// Returns `AdminGuardError::NotFound` if the user doesn't exist.
    /// Returns `AdminGuardError::Repository` for database errors, including
    /// `RepositoryError::Conflict` when the new email is taken.
    pub async fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<User, AdminGuardError> {
        let mut tx = self.pool.begin().await?;
        users::lock_admin_mutations(&mut *tx).await?;

        let target = users::find_for_update(&mut *tx, id)
            .await?
            .ok_or(AdminGuardError::NotFound)?;
        let active_admins = users::count_active_admins(&mut *tx).await?;

        if let Err(violation) = evaluate_update(&target, changes, active_admins) {
            tracing::info!(user_id = %id, active_admins, %violation, "user update refused");
            return Err(violation.into());
        }

        let updated = users::apply_changes(&mut *tx, id, changes).await?;
        tx.commit().await?;

        tracing::info!(user_id = %id, role = %updated.role, is_active = updated.is_active, "user updated");
        Ok(updated)
    }

    /// Delete a user unless it is the requester or the last active admin.
    ///
    /// # Errors
    ///
    /// Returns `AdminGuardError::Violation` if the deletion is refused.
    /// Returns `AdminGuardError::NotFound` if the user doesn't exist.
    /// Returns `AdminGuardError::Repository` for database errors.
    pub async fn delete_user(&self, requester: UserId, id: UserId) -> Result<(), AdminGuardError> {
        if requester == id {
            tracing::info!(user_id = %id, "self-delete refused");
            return Err(Violation::SelfDelete.into());
        }

        let mut tx = self.pool.begin().await?;
        users::lock_admin_mutations(&mut *tx).await?;

        let target = users::find_for_update(&mut *tx, id)
            .await?
            .ok_or(AdminGuardError::NotFound)?;
        let active_admins = users::count_active_admins(&mut *tx).await?;

        if let Err(violation) = evaluate_delete(requester, &target, active_admins) {
            tracing::info!(user_id = %id, active_admins, %violation, "user delete refused");
            return Err(violation.into());
        }

        users::delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
