use std::collections::{BTreeMap, BTreeSet};

use ml_core::{MlError, Result};
use serde::{Deserialize, Serialize};

/// The source name used for intercept keys.
pub const BIAS: &str = "bias";

const ARROW: &str = "->";

/// Key of the coefficient linking `feature` to `target`.
pub fn coefficient_key(feature: &str, target: &str) -> String {
    format!("{feature}{ARROW}{target}")
}

/// Key of the intercept of `target`.
pub fn bias_key(target: &str) -> String {
    coefficient_key(BIAS, target)
}

/// Key of the coefficient linking `feature` to one `category` of `target`.
pub fn category_key(feature: &str, target: &str, category: &str) -> String {
    format!("{feature}{ARROW}{target}:{category}")
}

/// Key of the intercept of one `category` of `target`.
pub fn category_bias_key(target: &str, category: &str) -> String {
    category_key(BIAS, target, category)
}

/// Splits a key into its source (a feature or `bias`) and its target part.
///
/// The target part of a categorical key still carries its `:<category>` suffix.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(ARROW)
}

/// Flat table of every learned scalar, keyed by the composite key grammar
/// `<feature>-><target>[:<category>]`.
///
/// The table is the only source of truth of which targets were trained: readers
/// rebuild that set by parsing keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    values: BTreeMap<String, f64>,
}

impl Weights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the weight stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Returns the weight stored under `key`, reading a missing key as `0`.
    pub fn value(&self, key: &str) -> f64 {
        self.get(key).unwrap_or_default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Creates `key` with a zero weight unless it already exists.
    pub fn ensure(&mut self, key: impl Into<String>) {
        self.values.entry(key.into()).or_insert(0.0);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Rebuilds the set of target parts present in the keys.
    pub fn targets(&self) -> BTreeSet<&str> {
        self.values
            .keys()
            .filter_map(|key| split_key(key))
            .map(|(_, target)| target)
            .collect()
    }

    /// Serializes the weights into their canonical snapshot form.
    ///
    /// # Errors
    /// * `MlError::NonFiniteWeight` if a weight is NaN or infinite, such a
    ///   snapshot could not be read back.
    /// * `MlError::Serialization` if the snapshot cannot be written.
    pub fn to_json(&self) -> Result<String> {
        if let Some((key, _)) = self.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MlError::NonFiniteWeight(key.to_string()));
        }

        Ok(serde_json::to_string(self)?)
    }

    /// Parses a weights snapshot.
    ///
    /// # Errors
    /// Returns `MlError::Deserialization` on malformed text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| MlError::Deserialization {
            what: "weights",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_grammar() {
        assert_eq!(coefficient_key("size", "price"), "size->price");
        assert_eq!(bias_key("price"), "bias->price");
        assert_eq!(category_key("x", "color", "red"), "x->color:red");
        assert_eq!(category_bias_key("color", "red"), "bias->color:red");
        assert_eq!(split_key("x->color:red"), Some(("x", "color:red")));
        assert_eq!(split_key("garbage"), None);
    }

    #[test]
    fn missing_keys_read_as_zero() {
        let mut weights = Weights::new();
        assert_eq!(weights.get("a->b"), None);
        assert_eq!(weights.value("a->b"), 0.0);

        weights.set("a->b", 1.5);
        weights.ensure("a->b");
        assert_eq!(weights.value("a->b"), 1.5);
    }

    #[test]
    fn targets_are_rebuilt_from_keys() {
        let mut weights = Weights::new();
        weights.ensure(coefficient_key("x", "y"));
        weights.ensure(bias_key("y"));
        weights.ensure(bias_key("z"));

        assert_eq!(weights.targets().into_iter().collect::<Vec<_>>(), ["y", "z"]);
    }

    #[test]
    fn snapshot_shape() {
        let mut weights = Weights::new();
        weights.set("x->y", 0.25);

        assert_eq!(weights.to_json().unwrap(), r#"{"values":{"x->y":0.25}}"#);
        assert_eq!(Weights::from_json(r#"{"values":{"x->y":0.25}}"#).unwrap(), weights);
    }

    #[test]
    fn non_finite_weights_are_not_serialized() {
        let mut weights = Weights::new();
        weights.set("x->y", 0.5);
        weights.set("bias->y", f64::NAN);

        assert!(matches!(
            weights.to_json(),
            Err(MlError::NonFiniteWeight(key)) if key == "bias->y"
        ));

        weights.set("bias->y", f64::INFINITY);
        assert!(weights.to_json().is_err());
    }

    #[test]
    fn malformed_snapshot() {
        assert!(matches!(
            Weights::from_json("{not valid json}"),
            Err(MlError::Deserialization { what: "weights", .. })
        ));
        assert!(Weights::from_json(r#"{"values": {"x->y": "a"}}"#).is_err());
    }
}
