//! Integration tests for sitedesk.
//!
//! # Running Tests
//!
//! ```bash
//! export TEST_DATABASE_URL=postgres://localhost/sitedesk_test
//! cargo test -p sitedesk-integration-tests -- --ignored
//! ```
//!
//! Every test truncates the `cms` tables, so point `TEST_DATABASE_URL` at a
//! throwaway database. Tests inside one binary are serialized by
//! [`TestDb`]; cargo runs test binaries one at a time.
//!
//! # Test Categories
//!
//! - `site_settings` - Upsert and round-trip properties of the settings store
//! - `admin_guard` - Last-admin and self-delete invariants, including races
//! - `auth` - Password login and setting passwords later
//! - `http` - Full router with a real database: login redirect, guarded routes

use secrecy::SecretString;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use sitedesk_core::{Email, UserRole};
use sitedesk_server::db::{MIGRATOR, UserRepository, create_pool};
use sitedesk_server::models::User;
use sitedesk_server::services::hash_password;

static DB_LOCK: Mutex<()> = Mutex::const_new(());

/// A migrated, emptied test database held exclusively by one test.
pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

impl TestDb {
    /// Connect to `TEST_DATABASE_URL`, migrate, and truncate all tables.
    ///
    /// # Panics
    ///
    /// Panics if the variable is unset or the database is unusable.
    #[allow(clippy::expect_used)]
    pub async fn new() -> Self {
        let guard = DB_LOCK.lock().await;

        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let pool = create_pool(&SecretString::from(url))
            .await
            .expect("failed to connect to test database");

        MIGRATOR.run(&pool).await.expect("failed to run migrations");
        sqlx::query("TRUNCATE cms.app_user, cms.site_setting, cms.session RESTART IDENTITY")
            .execute(&pool)
            .await
            .expect("failed to truncate tables");

        Self {
            pool,
            _guard: guard,
        }
    }

    /// Insert a user directly.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    #[allow(clippy::expect_used)]
    pub async fn seed_user(
        &self,
        email: &str,
        role: UserRole,
        password: Option<&str>,
    ) -> User {
        let hash = password.map(|p| hash_password(p).expect("valid test password"));
        let email = Email::parse(email).expect("valid test email");
        UserRepository::new(&self.pool)
            .create(&email, email.as_str(), role, hash.as_deref())
            .await
            .expect("failed to seed user")
    }

    /// Re-read a user.
    ///
    /// # Panics
    ///
    /// Panics if the query fails.
    #[allow(clippy::expect_used)]
    pub async fn user(&self, user: &User) -> Option<User> {
        UserRepository::new(&self.pool)
            .get_by_id(user.id)
            .await
            .expect("failed to load user")
    }

    /// Current number of active admins.
    ///
    /// # Panics
    ///
    /// Panics if the query fails.
    #[allow(clippy::expect_used)]
    pub async fn active_admins(&self) -> i64 {
        UserRepository::new(&self.pool)
            .count_active_admins()
            .await
            .expect("failed to count admins")
    }
}
