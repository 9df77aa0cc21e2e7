//! Site settings commands.
//!
//! # Usage
//!
//! ```bash
//! sitedesk settings list
//! sitedesk settings set about_title '"Who we are"'
//! sitedesk settings set about_stats '[{"label":"Offices","value":"3"}]' --type json
//! ```

use sitedesk_core::SettingType;
use sitedesk_server::db::SettingsRepository;
use sitedesk_server::services::SettingsService;

use super::{CommandError, connect};

/// Print every setting as `key [type] = value`.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let settings = SettingsRepository::new(&pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        for setting in &settings {
            println!(
                "{} [{}] = {}",
                setting.key, setting.setting_type, setting.value
            );
        }
    }

    tracing::info!("{} setting(s)", settings.len());
    Ok(())
}

/// Upsert one setting with the same validation as the API.
pub async fn set(key: &str, value: &str, setting_type: &str) -> Result<(), CommandError> {
    let setting_type: SettingType = setting_type.parse().map_err(|_| {
        CommandError::InvalidArgument(format!(
            "Invalid setting type: {setting_type}. Valid types: string, json"
        ))
    })?;

    let pool = connect().await?;
    let setting = SettingsService::new(&pool)
        .upsert(key, value, setting_type)
        .await?;

    tracing::info!(
        "Saved {} [{}] (updated {})",
        setting.key,
        setting.setting_type,
        setting.updated_at
    );
    Ok(())
}
