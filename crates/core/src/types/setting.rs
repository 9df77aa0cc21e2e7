//! Site setting key and value-type types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a stored setting value.
///
/// Every stored value is JSON-encoded text regardless of its type; the type
/// tells readers whether the decoded JSON is a plain string or a structured
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "cms.setting_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// A JSON-encoded string.
    #[default]
    String,
    /// An arbitrary JSON document.
    Json,
}

impl SettingType {
    /// Check that `raw` is an acceptable stored value for this type.
    ///
    /// `json` values must parse; `string` values are accepted as-is since
    /// older rows may hold unencoded text.
    ///
    /// # Errors
    ///
    /// Returns the parse error when a `json` value is not valid JSON.
    pub fn validate_raw(self, raw: &str) -> Result<(), serde_json::Error> {
        match self {
            Self::Json => serde_json::from_str::<serde_json::Value>(raw).map(|_| ()),
            Self::String => Ok(()),
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for SettingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "json" => Ok(Self::Json),
            _ => Err(format!("invalid setting type: {s}")),
        }
    }
}

/// Errors that can occur when parsing a [`SettingKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingKeyError {
    /// The key is empty.
    #[error("setting key cannot be empty")]
    Empty,
    /// The key is too long.
    #[error("setting key must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The key does not start with a lowercase letter.
    #[error("setting key must start with a lowercase letter")]
    InvalidStart,
    /// The key contains a character outside `[a-z0-9_.-]`.
    #[error("setting key contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A validated setting key such as `about_title` or `social_links`.
///
/// ```
/// use sitedesk_core::SettingKey;
///
/// assert!(SettingKey::parse("contact_email").is_ok());
/// assert!(SettingKey::parse("Contact Email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SettingKey(String);

impl SettingKey {
    /// Maximum key length, matching the column width.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a setting key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, longer than
    /// [`Self::MAX_LENGTH`], does not start with a lowercase ASCII letter,
    /// or contains characters other than `a-z`, `0-9`, `_`, `-` and `.`.
    pub fn parse(s: &str) -> Result<Self, SettingKeyError> {
        let first = s.chars().next().ok_or(SettingKeyError::Empty)?;
        if s.len() > Self::MAX_LENGTH {
            return Err(SettingKeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !first.is_ascii_lowercase() {
            return Err(SettingKeyError::InvalidStart);
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')))
        {
            return Err(SettingKeyError::InvalidCharacter(bad));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SettingKey {
    type Error = SettingKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SettingKey> for String {
    fn from(key: SettingKey) -> Self {
        key.0
    }
}

impl AsRef<str> for SettingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_convention_keys() {
        for key in ["about_title", "social_links", "seo.meta-title", "hero_cta2"] {
            assert_eq!(SettingKey::parse(key).unwrap().as_str(), key);
        }
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(SettingKey::parse(""), Err(SettingKeyError::Empty));
        assert_eq!(SettingKey::parse("_x"), Err(SettingKeyError::InvalidStart));
        assert_eq!(SettingKey::parse("About"), Err(SettingKeyError::InvalidStart));
        assert_eq!(
            SettingKey::parse("about title"),
            Err(SettingKeyError::InvalidCharacter(' '))
        );
        assert!(matches!(
            SettingKey::parse(&"a".repeat(101)),
            Err(SettingKeyError::TooLong { max: 100 })
        ));
    }

    #[test]
    fn json_type_requires_valid_json() {
        assert!(SettingType::Json.validate_raw(r#"{"a":1}"#).is_ok());
        assert!(SettingType::Json.validate_raw("{oops").is_err());
        assert!(SettingType::String.validate_raw("{oops").is_ok());
    }

    #[test]
    fn setting_type_wire_names() {
        assert_eq!(serde_json::to_string(&SettingType::Json).unwrap(), "\"json\"");
        assert_eq!("string".parse::<SettingType>().unwrap(), SettingType::String);
    }
}
