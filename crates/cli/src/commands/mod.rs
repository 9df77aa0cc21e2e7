//! Command implementations.

pub mod migrate;
pub mod settings;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use sitedesk_server::db::{RepositoryError, create_pool};
use sitedesk_server::services::{AuthError, SettingsError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Invalid command argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// Password validation or hashing failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Setting validation or write failed.
    #[error("{0}")]
    Settings(#[from] SettingsError),
}

/// Connect using `SITEDESK_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SITEDESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("SITEDESK_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(create_pool(&SecretString::from(database_url)).await?)
}
