//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first admin
//! sitedesk user create -e admin@example.com -n "Admin Name" -r admin --password 'change me now'
//!
//! # Give an existing user a (new) password
//! sitedesk user set-password -e editor@example.com --password 'another secret'
//! ```

use sitedesk_core::{Email, UserRole};
use sitedesk_server::db::{RepositoryError, UserRepository};
use sitedesk_server::services::{AuthService, hash_password};

use super::{CommandError, connect};

/// Create a new user.
///
/// Without a password the user exists but cannot log in until
/// `user set-password` gives it one.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: Option<&str>,
) -> Result<i32, CommandError> {
    let role: UserRole = role.parse().map_err(|_| {
        CommandError::InvalidArgument(format!(
            "Invalid role: {role}. Valid roles: admin, editor, viewer"
        ))
    })?;
    let email = parse_email(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidArgument(
            "Name cannot be empty".to_owned(),
        ));
    }
    let password_hash = password.map(hash_password).transpose()?;

    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", email, role);
    let user = UserRepository::new(&pool)
        .create(&email, name, role, password_hash.as_deref())
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                CommandError::InvalidArgument(format!("User already exists with email: {email}"))
            }
            other => other.into(),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    if password_hash.is_none() {
        tracing::warn!(
            "Note: User has no password; use `sitedesk user set-password` before logging in."
        );
    }

    Ok(user.id.as_i32())
}

/// Set or replace the password of the user with this email.
pub async fn set_password(email: &str, password: &str) -> Result<(), CommandError> {
    let email = parse_email(email)?;

    let pool = connect().await?;
    let (user, _) = UserRepository::new(&pool)
        .get_with_password_hash(&email)
        .await?
        .ok_or_else(|| CommandError::InvalidArgument(format!("No user with email: {email}")))?;

    AuthService::new(&pool).set_password(user.id, password).await?;

    tracing::info!("Password set for {} (ID: {})", user.email, user.id);
    if !user.is_active {
        tracing::warn!("Note: User is inactive and still cannot log in.");
    }
    Ok(())
}

fn parse_email(raw: &str) -> Result<Email, CommandError> {
    Email::parse(raw).map_err(|e| CommandError::InvalidArgument(format!("Invalid email: {e}")))
}
