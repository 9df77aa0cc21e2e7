//! Site setting repository.
//!
//! Settings are `(key, value, type)` rows. Writes go through a single
//! `INSERT ... ON CONFLICT` statement so two concurrent first writes of the
//! same key cannot both insert.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sitedesk_core::{SettingId, SettingKey, SettingType};

use super::RepositoryError;
use crate::models::Setting;

/// Internal row type for `cms.site_setting` queries.
#[derive(Debug, sqlx::FromRow)]
struct SettingRow {
    id: i32,
    setting_key: String,
    setting_value: String,
    setting_type: SettingType,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SettingRow> for Setting {
    type Error = RepositoryError;

    fn try_from(row: SettingRow) -> Result<Self, Self::Error> {
        let key = SettingKey::parse(&row.setting_key).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid setting key {:?} in database: {e}",
                row.setting_key
            ))
        })?;

        Ok(Self {
            id: SettingId::new(row.id),
            key,
            value: row.setting_value,
            setting_type: row.setting_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn valid_settings(rows: Vec<SettingRow>) -> Vec<Setting> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            Setting::try_from(row)
                .inspect_err(|e| {
                    tracing::warn!(setting_id = id, error = %e, "skipping stored setting");
                })
                .ok()
        })
        .collect()
}

/// Repository for site setting database operations.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every setting, ordered by key.
    ///
    /// Rows whose stored key is not a valid [`SettingKey`] are skipped with a
    /// warning so one bad row cannot hide the rest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Setting>, RepositoryError> {
        let rows = sqlx::query_as::<_, SettingRow>(
            r"
            SELECT id, setting_key, setting_value, setting_type, created_at, updated_at
            FROM cms.site_setting
            ORDER BY setting_key
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(valid_settings(rows))
    }

    /// Get one setting by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row has this key.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_key(&self, key: &SettingKey) -> Result<Setting, RepositoryError> {
        let row = sqlx::query_as::<_, SettingRow>(
            r"
            SELECT id, setting_key, setting_value, setting_type, created_at, updated_at
            FROM cms.site_setting
            WHERE setting_key = $1
            ",
        )
        .bind(key.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Create the setting or overwrite its value and type.
    ///
    /// Calling this twice with the same arguments leaves exactly one row.
    /// Concurrent writers to the same key resolve last-write-wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(
        &self,
        key: &SettingKey,
        value: &str,
        setting_type: SettingType,
    ) -> Result<Setting, RepositoryError> {
        let row = sqlx::query_as::<_, SettingRow>(
            r"
            INSERT INTO cms.site_setting (setting_key, setting_value, setting_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (setting_key) DO UPDATE
                SET setting_value = EXCLUDED.setting_value,
                    setting_type = EXCLUDED.setting_type,
                    updated_at = NOW()
            RETURNING id, setting_key, setting_value, setting_type, created_at, updated_at
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(setting_type)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(key = %key, setting_type = %setting_type, "setting upserted");
        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(id: i32, key: &str) -> SettingRow {
        SettingRow {
            id,
            setting_key: key.to_owned(),
            setting_value: "\"x\"".to_owned(),
            setting_type: SettingType::String,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn invalid_stored_key_is_skipped() {
        let settings = valid_settings(vec![
            row(1, "about_title"),
            row(2, "Contact Email"),
            row(3, "hero_title"),
        ]);
        let keys: Vec<&str> = settings.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["about_title", "hero_title"]);
    }

    #[test]
    fn invalid_stored_key_is_reported_as_corruption() {
        let err = Setting::try_from(row(2, "Contact Email")).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
