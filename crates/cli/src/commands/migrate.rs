//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sitedesk migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server library, so the CLI always applies the schema the server expects.

use sitedesk_server::db::MIGRATOR;

use super::{CommandError, connect};

/// Run all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
