use std::{error::Error, fmt};

/// The result type shared by the training and inference crates.
pub type Result<T> = std::result::Result<T, MlError>;

/// Errors returned by the engine, its trainers and its predictors.
#[derive(Debug)]
pub enum MlError {
    /// No model descriptor has been set or loaded.
    ModelNotInitialized,

    /// No weights exist yet, the model was never trained nor were weights loaded.
    WeightsNotInitialized,

    /// A shape invariant was violated (e.g. mismatched record counts).
    ShapeMismatch {
        /// Human-readable context for the mismatch (e.g. "outputs").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },

    /// Training was requested with zero records.
    EmptyTrainingSet,

    /// The model snapshot names a variant that is not known.
    UnsupportedModelVariant(String),

    /// A snapshot could not be parsed.
    Deserialization {
        what: &'static str,
        source: serde_json::Error,
    },

    /// A snapshot could not be written.
    Serialization(serde_json::Error),

    /// A weight is NaN or infinite, training diverged.
    NonFiniteWeight(String),

    /// The output records are unusable for the requested operation.
    InvalidOutput(&'static str),

    /// The training configuration violates one of its bounds.
    InvalidConfig(String),
}

impl fmt::Display for MlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlError::ModelNotInitialized => f.write_str("model not initialized"),
            MlError::WeightsNotInitialized => {
                f.write_str("weights not initialized, model not trained")
            }
            MlError::ShapeMismatch { what, got, expected } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            MlError::EmptyTrainingSet => f.write_str("no training data provided"),
            MlError::UnsupportedModelVariant(kind) => {
                write!(f, "unsupported model type: {kind}")
            }
            MlError::Deserialization { what, source } => {
                write!(f, "failed to deserialize {what}: {source}")
            }
            MlError::Serialization(e) => write!(f, "failed to serialize: {e}"),
            MlError::NonFiniteWeight(key) => {
                write!(f, "weight {key} is not finite, training diverged")
            }
            MlError::InvalidOutput(msg) => write!(f, "invalid output data: {msg}"),
            MlError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for MlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlError::Deserialization { source, .. } => Some(source),
            MlError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MlError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
