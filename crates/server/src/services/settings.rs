//! Validated writes to site settings.
//!
//! Shared by the HTTP API and the CLI so both accept exactly the same input.

use sqlx::PgPool;
use thiserror::Error;

use sitedesk_core::{SettingKey, SettingKeyError, SettingType};

use crate::db::{RepositoryError, SettingsRepository};
use crate::models::Setting;

/// Largest accepted `setting_value`, in bytes.
pub const MAX_VALUE_BYTES: usize = 64 * 1024;

/// Errors from setting writes.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The key breaks the key grammar.
    #[error("invalid setting_key: {0}")]
    InvalidKey(#[from] SettingKeyError),

    /// A `json` setting whose value does not parse.
    #[error("setting_value is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The value exceeds [`MAX_VALUE_BYTES`].
    #[error("setting_value exceeds {MAX_VALUE_BYTES} bytes")]
    ValueTooLarge,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Check a value against its declared type.
///
/// # Errors
///
/// Returns `SettingsError::ValueTooLarge` or `SettingsError::InvalidJson`.
pub fn validate_value(value: &str, setting_type: SettingType) -> Result<(), SettingsError> {
    if value.len() > MAX_VALUE_BYTES {
        return Err(SettingsError::ValueTooLarge);
    }
    setting_type.validate_raw(value)?;
    Ok(())
}

/// Settings write service.
pub struct SettingsService<'a> {
    settings: SettingsRepository<'a>,
}

impl<'a> SettingsService<'a> {
    /// Create a new settings service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            settings: SettingsRepository::new(pool),
        }
    }

    /// Validate and upsert one setting.
    ///
    /// # Errors
    ///
    /// Returns a validation variant of `SettingsError` for bad input.
    /// Returns `SettingsError::Repository` if the write fails.
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        setting_type: SettingType,
    ) -> Result<Setting, SettingsError> {
        let key = SettingKey::parse(key)?;
        validate_value(value, setting_type)?;
        Ok(self.settings.upsert(&key, value, setting_type).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_values_must_parse() {
        assert!(validate_value(r#"{"a":1}"#, SettingType::Json).is_ok());
        assert!(matches!(
            validate_value("{oops", SettingType::Json),
            Err(SettingsError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_string_values_are_free_form() {
        assert!(validate_value("{oops", SettingType::String).is_ok());
        assert!(validate_value("", SettingType::String).is_ok());
    }

    #[test]
    fn test_oversized_value_rejected() {
        let big = "x".repeat(MAX_VALUE_BYTES + 1);
        assert!(matches!(
            validate_value(&big, SettingType::String),
            Err(SettingsError::ValueTooLarge)
        ));
    }
}
