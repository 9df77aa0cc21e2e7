//! Site setting domain type.

use chrono::{DateTime, Utc};

use sitedesk_core::{SettingId, SettingKey, SettingType};

/// A stored site setting (domain type).
///
/// `value` is the raw stored text. By convention it is JSON-encoded whatever
/// the declared type; decoding is left to the site-config interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Database ID.
    pub id: SettingId,
    /// Unique key, e.g. `about_title`.
    pub key: SettingKey,
    /// Raw stored value.
    pub value: String,
    /// Declared value type.
    pub setting_type: SettingType,
    /// When the key was first written.
    pub created_at: DateTime<Utc>,
    /// When the value last changed.
    pub updated_at: DateTime<Utc>,
}
