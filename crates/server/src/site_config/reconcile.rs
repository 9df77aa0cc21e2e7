//! Merging decoded fields over a section's defaults.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::interpreter::{DecodeFailure, Decoded, FieldFallback};
use super::Namespace;

/// A typed configuration section backed by one namespace.
pub trait SiteSection: Default + Serialize + DeserializeOwned {
    /// The namespace this section is read from.
    const NAMESPACE: Namespace;
}

/// A fully populated section and the fields that fell back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<T> {
    pub value: T,
    pub fallbacks: Vec<FieldFallback>,
}

impl<T> Reconciled<T> {
    /// Transform the value, keeping the fallbacks.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reconciled<U> {
        Reconciled {
            value: f(self.value),
            fallbacks: self.fallbacks,
        }
    }
}

/// Overlay `decoded` on `defaults`.
///
/// Each decoded field is accepted only if the section still deserializes
/// with it in place. Fields that do not fit keep their default and are added
/// to the fallbacks. The result is always a complete `T`.
#[must_use]
pub fn reconcile<T: SiteSection>(defaults: T, decoded: Decoded) -> Reconciled<T> {
    let Decoded {
        values,
        mut fallbacks,
    } = decoded;

    let mut merged = match serde_json::to_value(&defaults) {
        Ok(Value::Object(map)) => map,
        _ => {
            tracing::error!(namespace = %T::NAMESPACE, "section defaults are not a JSON object");
            return Reconciled {
                value: defaults,
                fallbacks,
            };
        }
    };

    let mut value = defaults;
    for (field, candidate) in values {
        let mut trial: Map<String, Value> = merged.clone();
        trial.insert(field.to_owned(), candidate);
        match serde_json::from_value::<T>(Value::Object(trial.clone())) {
            Ok(accepted) => {
                merged = trial;
                value = accepted;
            }
            Err(e) => {
                let reason = DecodeFailure::Incompatible(e.to_string());
                tracing::warn!(namespace = %T::NAMESPACE, field, %reason, "setting falls back to default");
                fallbacks.push(FieldFallback {
                    field: field.to_owned(),
                    reason,
                });
            }
        }
    }

    Reconciled { value, fallbacks }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        title: String,
        tags: Vec<String>,
        visible: bool,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                title: "Default".to_owned(),
                tags: vec!["a".to_owned()],
                visible: true,
            }
        }
    }

    impl SiteSection for Sample {
        const NAMESPACE: Namespace = Namespace::About;
    }

    fn decoded(pairs: &[(&'static str, Value)]) -> Decoded {
        Decoded {
            values: pairs.iter().cloned().collect(),
            fallbacks: vec![],
        }
    }

    #[test]
    fn empty_input_yields_defaults() {
        let result = reconcile(Sample::default(), Decoded::default());
        assert_eq!(result.value, Sample::default());
        assert!(result.fallbacks.is_empty());
    }

    #[test]
    fn stored_values_override_defaults() {
        let result = reconcile(
            Sample::default(),
            decoded(&[("title", json!("Ours")), ("visible", json!(false))]),
        );
        assert_eq!(result.value.title, "Ours");
        assert!(!result.value.visible);
        assert_eq!(result.value.tags, vec!["a"]);
    }

    #[test]
    fn wrong_shape_keeps_default_for_that_field_only() {
        let result = reconcile(
            Sample::default(),
            decoded(&[("tags", json!({"not": "a list"})), ("title", json!("Kept"))]),
        );
        assert_eq!(result.value.tags, vec!["a"]);
        assert_eq!(result.value.title, "Kept");
        assert_eq!(result.fallbacks.len(), 1);
        assert_eq!(result.fallbacks[0].field, "tags");
        assert!(matches!(
            result.fallbacks[0].reason,
            DecodeFailure::Incompatible(_)
        ));
    }

    #[test]
    fn interpreter_fallbacks_are_carried() {
        let mut input = decoded(&[]);
        input.fallbacks.push(FieldFallback {
            field: "title".to_owned(),
            reason: DecodeFailure::MalformedJson("eof".to_owned()),
        });
        let result = reconcile(Sample::default(), input);
        assert_eq!(result.value, Sample::default());
        assert_eq!(result.fallbacks.len(), 1);
    }
}
