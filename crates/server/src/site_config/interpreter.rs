//! Decoding of flat setting rows into per-field JSON values.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use sitedesk_core::SettingType;

use super::{FieldKind, FieldSpec, Keying, Namespace};
use crate::models::Setting;

/// Why a field could not be taken from storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    /// A `json`-typed value did not parse.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// The value parsed but has the wrong shape for the field.
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: FieldKind,
        found: &'static str,
    },

    /// A singleton namespace's row is not a JSON object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// The decoded value did not fit the section's field type.
    #[error("incompatible with section field: {0}")]
    Incompatible(String),
}

/// A field that fell back to its default, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFallback {
    /// Field name within the namespace, or the singleton key itself.
    pub field: String,
    pub reason: DecodeFailure,
}

/// Fields of one namespace that decoded successfully, plus the ones that did not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    pub values: BTreeMap<&'static str, Value>,
    pub fallbacks: Vec<FieldFallback>,
}

/// Select `namespace`'s rows from `settings` and decode each known field.
///
/// Rows for unknown fields are ignored. Every failure is logged and recorded
/// in [`Decoded::fallbacks`]; nothing here is fatal.
#[must_use]
pub fn interpret(namespace: Namespace, settings: &[Setting]) -> Decoded {
    let mut decoded = Decoded::default();

    match namespace.keying() {
        Keying::Prefix(prefix) => {
            for setting in settings {
                let Some(spec) = setting
                    .key
                    .as_str()
                    .strip_prefix(prefix)
                    .and_then(|field| namespace.field(field))
                else {
                    continue;
                };
                let result = parse_raw(&setting.value, setting.setting_type)
                    .and_then(|value| coerce(spec.kind, value));
                decoded.push(namespace, spec, result);
            }
        }
        Keying::Singleton(key) => {
            let Some(setting) = settings.iter().find(|s| s.key.as_str() == key) else {
                return decoded;
            };
            match parse_raw(&setting.value, setting.setting_type) {
                Ok(Value::Object(members)) => {
                    for (name, value) in members {
                        if let Some(spec) = namespace.field(&name) {
                            decoded.push(namespace, spec, coerce(spec.kind, value));
                        }
                    }
                }
                Ok(other) => decoded.fail(namespace, key, DecodeFailure::NotAnObject(shape(&other))),
                Err(reason) => decoded.fail(namespace, key, reason),
            }
        }
    }

    decoded
}

impl Decoded {
    fn push(&mut self, namespace: Namespace, spec: FieldSpec, result: Result<Value, DecodeFailure>) {
        match result {
            Ok(value) => {
                self.values.insert(spec.name, value);
            }
            Err(reason) => self.fail(namespace, spec.name, reason),
        }
    }

    fn fail(&mut self, namespace: Namespace, field: &str, reason: DecodeFailure) {
        tracing::warn!(%namespace, field, %reason, "setting falls back to default");
        self.fallbacks.push(FieldFallback {
            field: field.to_owned(),
            reason,
        });
    }
}

/// Parse a stored value by its declared type.
///
/// `string` rows are parsed as JSON when they can be, so `"\"Hi\""` and
/// `"true"` decode to a string and a boolean. Legacy `string` rows holding
/// raw text pass through unchanged.
fn parse_raw(raw: &str, setting_type: SettingType) -> Result<Value, DecodeFailure> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Ok(value),
        Err(_) if setting_type == SettingType::String => Ok(Value::String(raw.to_owned())),
        Err(e) => Err(DecodeFailure::MalformedJson(e.to_string())),
    }
}

fn coerce(kind: FieldKind, value: Value) -> Result<Value, DecodeFailure> {
    match (kind, value) {
        (FieldKind::Json, value) => Ok(value),
        (FieldKind::Text, value @ Value::String(_)) => Ok(value),
        (FieldKind::Text, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (FieldKind::Text, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (FieldKind::Bool, value @ Value::Bool(_)) => Ok(value),
        (FieldKind::Bool, Value::String(s)) if s == "true" => Ok(Value::Bool(true)),
        (FieldKind::Bool, Value::String(s)) if s == "false" => Ok(Value::Bool(false)),
        (expected, other) => Err(DecodeFailure::UnexpectedShape {
            expected,
            found: shape(&other),
        }),
    }
}

const fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::Utc;
    use serde_json::json;

    use sitedesk_core::{SettingId, SettingKey};

    use super::*;

    pub(crate) fn setting(key: &str, value: &str, setting_type: SettingType) -> Setting {
        Setting {
            id: SettingId::new(1),
            key: SettingKey::parse(key).unwrap(),
            value: value.to_owned(),
            setting_type,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn selects_by_prefix_and_strips_it() {
        let rows = [
            setting("about_title", "\"Who we are\"", SettingType::String),
            setting("hero_title", "\"Welcome\"", SettingType::String),
        ];
        let decoded = interpret(Namespace::About, &rows);
        assert_eq!(decoded.values.len(), 1);
        assert_eq!(decoded.values["title"], json!("Who we are"));
        assert!(decoded.fallbacks.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let rows = [setting("about_favourite_colour", "\"blue\"", SettingType::String)];
        let decoded = interpret(Namespace::About, &rows);
        assert!(decoded.values.is_empty());
        assert!(decoded.fallbacks.is_empty());
    }

    #[test]
    fn raw_string_passes_through() {
        let rows = [setting("general_name", "Acme Corp", SettingType::String)];
        let decoded = interpret(Namespace::General, &rows);
        assert_eq!(decoded.values["name"], json!("Acme Corp"));
    }

    #[test]
    fn bool_accepts_both_encodings() {
        let rows = [
            setting("about_show_team", "\"false\"", SettingType::String),
            setting("hero_show_video", "true", SettingType::Json),
        ];
        assert_eq!(
            interpret(Namespace::About, &rows).values["show_team"],
            json!(false)
        );
        assert_eq!(
            interpret(Namespace::Hero, &rows).values["show_video"],
            json!(true)
        );
    }

    #[test]
    fn bool_rejects_other_strings() {
        let rows = [setting("about_show_team", "\"yes\"", SettingType::String)];
        let decoded = interpret(Namespace::About, &rows);
        assert!(decoded.values.is_empty());
        assert_eq!(
            decoded.fallbacks[0].reason,
            DecodeFailure::UnexpectedShape {
                expected: FieldKind::Bool,
                found: "string"
            }
        );
    }

    #[test]
    fn malformed_json_is_a_fallback() {
        let rows = [setting("about_stats", "[{\"label\":", SettingType::Json)];
        let decoded = interpret(Namespace::About, &rows);
        assert!(decoded.values.is_empty());
        assert_eq!(decoded.fallbacks.len(), 1);
        assert_eq!(decoded.fallbacks[0].field, "stats");
        assert!(matches!(
            decoded.fallbacks[0].reason,
            DecodeFailure::MalformedJson(_)
        ));
    }

    #[test]
    fn text_renders_scalars() {
        let rows = [setting("contact_phone", "5551234", SettingType::String)];
        assert_eq!(
            interpret(Namespace::Contact, &rows).values["phone"],
            json!("5551234")
        );
    }

    #[test]
    fn singleton_members_become_fields() {
        let rows = [setting(
            "social_links",
            r#"{"twitter":"https://x.com/acme","myspace":"gone"}"#,
            SettingType::Json,
        )];
        let decoded = interpret(Namespace::SocialLinks, &rows);
        assert_eq!(decoded.values.len(), 1);
        assert_eq!(decoded.values["twitter"], json!("https://x.com/acme"));
    }

    #[test]
    fn singleton_must_be_an_object() {
        let rows = [setting("social_links", "[1,2]", SettingType::Json)];
        let decoded = interpret(Namespace::SocialLinks, &rows);
        assert!(decoded.values.is_empty());
        assert_eq!(decoded.fallbacks[0].field, "social_links");
        assert_eq!(decoded.fallbacks[0].reason, DecodeFailure::NotAnObject("array"));
    }

    #[test]
    fn missing_singleton_decodes_to_nothing() {
        assert_eq!(interpret(Namespace::SocialLinks, &[]), Decoded::default());
    }
}
