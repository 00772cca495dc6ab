use log::{debug, info};
use ml_core::{MlError, Prediction, Record, Result, TrainStats};

use crate::{Config, ModelDescriptor, Weights};

/// Owns one model descriptor, one weight store and one training
/// configuration, and routes training and prediction to the variant's
/// trainer and predictor.
///
/// An engine is not meant to be shared between threads while training; give
/// each worker its own engine or serialize access externally.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    model: Option<ModelDescriptor>,
    weights: Option<Weights>,
    config: Config,
}

impl Engine {
    /// Creates an engine with the default config and neither a model nor
    /// weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine whose model variant is selected from a sample output
    /// record.
    pub fn auto(output_sample: &Record) -> Self {
        Self::new().with_model(ModelDescriptor::auto(output_sample))
    }

    /// Selects a model from the first output record and trains it.
    ///
    /// # Errors
    /// Returns `MlError::InvalidOutput` if `outputs` is empty, or any error
    /// `Engine::train` returns.
    pub fn train_auto(inputs: &[Record], outputs: &[Record]) -> Result<Self> {
        let Some(sample) = outputs.first() else {
            return Err(MlError::InvalidOutput("no output data provided"));
        };

        let mut engine = Self::auto(sample);
        engine.train(inputs, outputs)?;
        Ok(engine)
    }

    /// Replaces the model descriptor.
    pub fn with_model(mut self, model: ModelDescriptor) -> Self {
        self.model = Some(model);
        self
    }

    /// Replaces the training configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the model descriptor with one parsed from a snapshot.
    ///
    /// # Errors
    /// Returns `MlError::Deserialization` or `MlError::UnsupportedModelVariant`
    /// if the snapshot is unusable, in which case the current model is kept.
    pub fn load_model(&mut self, text: &str) -> Result<&ModelDescriptor> {
        let model = ModelDescriptor::from_json(text)?;
        debug!("loaded {} model", model.variant());
        Ok(&*self.model.insert(model))
    }

    /// Replaces the weight store with one parsed from a snapshot.
    ///
    /// # Errors
    /// Returns `MlError::Deserialization` if the snapshot is unusable, in which
    /// case the current weights are kept.
    pub fn load_weights(&mut self, text: &str) -> Result<&Weights> {
        let weights = Weights::from_json(text)?;
        debug!("loaded {} weight(s)", weights.len());
        Ok(&*self.weights.insert(weights))
    }

    /// Trains the model on aligned input and output records.
    ///
    /// The weight store is created on the first call and refined by every
    /// later one, it is never reset.
    ///
    /// # Arguments
    /// * `inputs` - The feature records.
    /// * `outputs` - The target records, one per input.
    ///
    /// # Returns
    /// Statistics of the training run.
    ///
    /// # Errors
    /// * `MlError::ModelNotInitialized` if there is no model.
    /// * `MlError::ShapeMismatch` if the record counts differ.
    /// * `MlError::EmptyTrainingSet` if there are no records.
    /// * `MlError::InvalidConfig` if the config violates its bounds.
    pub fn train(&mut self, inputs: &[Record], outputs: &[Record]) -> Result<TrainStats> {
        let Some(model) = self.model.as_mut() else {
            return Err(MlError::ModelNotInitialized);
        };

        if inputs.len() != outputs.len() {
            return Err(MlError::ShapeMismatch {
                what: "outputs",
                got: outputs.len(),
                expected: inputs.len(),
            });
        }

        if inputs.is_empty() {
            return Err(MlError::EmptyTrainingSet);
        }

        self.config.validate()?;

        info!(
            samples = inputs.len();
            "training {} model", model.variant()
        );

        let weights = self.weights.get_or_insert_with(Weights::new);
        model.train(inputs, outputs, weights, &self.config)
    }

    /// Predicts every target the model knows for one input record.
    ///
    /// # Errors
    /// * `MlError::ModelNotInitialized` if there is no model.
    /// * `MlError::WeightsNotInitialized` if the model was never trained and no
    ///   weights were loaded.
    pub fn predict(&self, input: &Record) -> Result<Prediction> {
        let model = self.model.as_ref().ok_or(MlError::ModelNotInitialized)?;
        let weights = self.weights.as_ref().ok_or(MlError::WeightsNotInitialized)?;

        model.predict(input, weights)
    }

    /// Serializes the model descriptor.
    ///
    /// # Errors
    /// Returns `MlError::ModelNotInitialized` if there is no model.
    pub fn serialize_model(&self) -> Result<String> {
        self.model
            .as_ref()
            .ok_or(MlError::ModelNotInitialized)?
            .to_json()
    }

    /// Serializes the weight store.
    ///
    /// # Errors
    /// Returns `MlError::WeightsNotInitialized` if there are no weights.
    pub fn serialize_weights(&self) -> Result<String> {
        self.weights
            .as_ref()
            .ok_or(MlError::WeightsNotInitialized)?
            .to_json()
    }

    pub fn model(&self) -> Option<&ModelDescriptor> {
        self.model.as_ref()
    }

    pub fn weights(&self) -> Option<&Weights> {
        self.weights.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
