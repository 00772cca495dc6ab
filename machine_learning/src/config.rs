use std::num::NonZeroUsize;

use ml_core::{MlError, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_EPOCHS: NonZeroUsize = NonZeroUsize::new(100).unwrap();
const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(32).unwrap();

/// Training hyper-parameters.
///
/// Missing fields take their default value when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub learning_rate: f64,
    pub epochs: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    /// L2 regularization coefficient.
    pub regularize: f64,
    /// Minimum epoch-over-epoch loss improvement before training stops early.
    pub tolerance: f64,
    /// Whether the linear trainer divides numeric features by their mean.
    pub normalize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            regularize: 0.0001,
            tolerance: 0.0001,
            normalize: true,
        }
    }
}

impl Config {
    /// Checks the bounds that the type system does not.
    ///
    /// # Errors
    /// Returns `MlError::InvalidConfig` on a non-positive learning rate or a
    /// negative regularization or tolerance.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(MlError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }

        if !(self.regularize >= 0.0) {
            return Err(MlError::InvalidConfig(format!(
                "regularize must not be negative, got {}",
                self.regularize
            )));
        }

        if !(self.tolerance >= 0.0) {
            return Err(MlError::InvalidConfig(format!(
                "tolerance must not be negative, got {}",
                self.tolerance
            )));
        }

        Ok(())
    }
}
