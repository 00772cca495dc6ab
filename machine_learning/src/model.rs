use std::{collections::BTreeMap, fmt, str::FromStr};

use ml_core::{MlError, Prediction, Record, Result, TrainStats};
use serde::{Deserialize, Serialize};

use crate::{
    Config, Weights, selection,
    training::{categorical, linear, logistic, mixed},
};

/// Category label to index, per target field.
pub type CategoryIndex = BTreeMap<String, usize>;

/// The kind of model, selecting which trainer and predictor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Linear,
    Logistic,
    Categorical,
    Mixed,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Linear => "linear",
            Variant::Logistic => "logistic",
            Variant::Categorical => "categorical",
            Variant::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Variant::Linear),
            "logistic" => Ok(Variant::Logistic),
            "categorical" => Ok(Variant::Categorical),
            "mixed" => Ok(Variant::Mixed),
            other => Err(MlError::UnsupportedModelVariant(other.to_string())),
        }
    }
}

/// How a target of a mixed model is trained and predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Numeric,
    Boolean,
    Categorical,
}

/// The persisted form of a `ModelDescriptor`.
#[derive(Debug, Serialize, Deserialize)]
struct ModelSnapshot {
    #[serde(rename = "type")]
    kind: String,
    parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    features: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    targets: BTreeMap<String, TargetType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    categories: BTreeMap<String, CategoryIndex>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    feature_categories: BTreeMap<String, CategoryIndex>,
}

/// Structural metadata of a fitted model.
///
/// The descriptor holds no weights; it says which trainer/predictor pair
/// applies and carries what they learn besides weights (category indices and
/// the per-target type of mixed models).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    variant: Variant,
    parameters: BTreeMap<String, serde_json::Value>,
    features: BTreeMap<String, serde_json::Value>,
    categories: BTreeMap<String, CategoryIndex>,
    feature_categories: BTreeMap<String, CategoryIndex>,
    target_types: BTreeMap<String, TargetType>,
}

impl ModelDescriptor {
    /// Creates an untrained descriptor of the given variant.
    pub fn new(variant: Variant) -> Self {
        let parameters = BTreeMap::from([("bias".to_string(), serde_json::Value::Bool(true))]);

        Self {
            variant,
            parameters,
            features: BTreeMap::new(),
            categories: BTreeMap::new(),
            feature_categories: BTreeMap::new(),
            target_types: BTreeMap::new(),
        }
    }

    pub fn linear() -> Self {
        Self::new(Variant::Linear)
    }

    pub fn logistic() -> Self {
        Self::new(Variant::Logistic)
    }

    pub fn categorical() -> Self {
        Self::new(Variant::Categorical)
    }

    pub fn mixed() -> Self {
        Self::new(Variant::Mixed)
    }

    /// Creates a descriptor whose variant suits the given output record.
    pub fn auto(output_sample: &Record) -> Self {
        Self::new(selection::select_variant(output_sample))
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn parameters(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.parameters
    }

    /// Category indices per categorical target.
    pub fn categories(&self) -> &BTreeMap<String, CategoryIndex> {
        &self.categories
    }

    /// Reserved for categorical features, currently always empty.
    pub fn feature_categories(&self) -> &BTreeMap<String, CategoryIndex> {
        &self.feature_categories
    }

    /// Per-target types, only populated by mixed models.
    pub fn target_types(&self) -> &BTreeMap<String, TargetType> {
        &self.target_types
    }

    pub(crate) fn categories_mut(&mut self) -> &mut BTreeMap<String, CategoryIndex> {
        &mut self.categories
    }

    pub(crate) fn set_target_type(&mut self, target: &str, kind: TargetType) {
        self.target_types.insert(target.to_string(), kind);
    }

    /// Trains the model, dispatching to the trainer of its variant.
    ///
    /// # Arguments
    /// * `inputs` - The feature records.
    /// * `outputs` - The target records, one per input.
    /// * `weights` - The store updated in place.
    /// * `config` - The training hyper-parameters.
    ///
    /// # Returns
    /// Statistics of the training run.
    pub fn train(
        &mut self,
        inputs: &[Record],
        outputs: &[Record],
        weights: &mut Weights,
        config: &Config,
    ) -> Result<TrainStats> {
        match self.variant {
            Variant::Linear => linear::train(inputs, outputs, weights, config),
            Variant::Logistic => logistic::train(inputs, outputs, weights, config),
            Variant::Categorical => {
                categorical::train(inputs, outputs, weights, config, &mut self.categories)
            }
            Variant::Mixed => mixed::train(inputs, outputs, weights, config, self),
        }
    }

    /// Predicts every known target for `input`, dispatching to the predictor
    /// of its variant.
    pub fn predict(&self, input: &Record, weights: &Weights) -> Result<Prediction> {
        let prediction = match self.variant {
            Variant::Linear => linear::predict(input, weights),
            Variant::Logistic => logistic::predict(input, weights),
            Variant::Categorical => categorical::predict(input, weights, &self.categories),
            Variant::Mixed => mixed::predict(input, weights, self),
        };

        Ok(prediction)
    }

    /// Serializes the descriptor into its canonical snapshot form.
    ///
    /// # Errors
    /// Returns `MlError::Serialization` if the snapshot cannot be written.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = ModelSnapshot {
            kind: self.variant.to_string(),
            parameters: self.parameters.clone(),
            features: self.features.clone(),
            targets: self.target_types.clone(),
            categories: self.categories.clone(),
            feature_categories: self.feature_categories.clone(),
        };

        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Parses a model snapshot.
    ///
    /// # Errors
    /// Returns `MlError::Deserialization` on malformed text and
    /// `MlError::UnsupportedModelVariant` if the `type` is unknown.
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: ModelSnapshot =
            serde_json::from_str(text).map_err(|source| MlError::Deserialization {
                what: "model",
                source,
            })?;

        Self::from_snapshot(snapshot)
    }

    fn from_snapshot(snapshot: ModelSnapshot) -> Result<Self> {
        Ok(Self {
            variant: snapshot.kind.parse()?,
            parameters: snapshot.parameters,
            features: snapshot.features,
            categories: snapshot.categories,
            feature_categories: snapshot.feature_categories,
            target_types: snapshot.targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_snapshot_omits_empty_maps() {
        let json = ModelDescriptor::linear().to_json().unwrap();
        assert_eq!(json, r#"{"type":"linear","parameters":{"bias":true}}"#);
    }

    #[test]
    fn snapshot_round_trip_keeps_categories_and_targets() {
        let mut model = ModelDescriptor::mixed();
        model.set_target_type("price", TargetType::Numeric);
        model.set_target_type("color", TargetType::Categorical);
        model
            .categories_mut()
            .insert("color".into(), BTreeMap::from([("red".into(), 0), ("blue".into(), 1)]));

        let json = model.to_json().unwrap();
        let loaded = ModelDescriptor::from_json(&json).unwrap();

        assert_eq!(loaded, model);
        assert!(json.contains(r#""targets":{"color":"categorical","price":"numeric"}"#));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let json = r#"{"type": "unsupported", "parameters": {"bias": true}}"#;

        assert!(matches!(
            ModelDescriptor::from_json(json),
            Err(MlError::UnsupportedModelVariant(kind)) if kind == "unsupported"
        ));
    }

    #[test]
    fn malformed_text_is_a_deserialization_error() {
        assert!(matches!(
            ModelDescriptor::from_json("{not valid json}"),
            Err(MlError::Deserialization { what: "model", .. })
        ));
        assert!(matches!(
            ModelDescriptor::from_json(r#"{"parameters": {}}"#),
            Err(MlError::Deserialization { .. })
        ));
    }

    #[test]
    fn variant_names() {
        for variant in [
            Variant::Linear,
            Variant::Logistic,
            Variant::Categorical,
            Variant::Mixed,
        ] {
            assert_eq!(variant.as_str().parse::<Variant>().unwrap(), variant);
        }
    }
}
