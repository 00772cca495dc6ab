use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use machine_learning::{Config, ModelDescriptor, Record, Variant};
use serde::{Deserialize, Serialize};

/// Which model a run trains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    /// Selected from the first output record of the dataset.
    #[default]
    Auto,
    Linear,
    Logistic,
    Categorical,
    Mixed,
}

impl ModelChoice {
    /// Builds the model descriptor, inspecting `output_sample` when the choice
    /// is automatic.
    pub fn descriptor(&self, output_sample: &Record) -> ModelDescriptor {
        match self {
            ModelChoice::Auto => ModelDescriptor::auto(output_sample),
            ModelChoice::Linear => ModelDescriptor::new(Variant::Linear),
            ModelChoice::Logistic => ModelDescriptor::new(Variant::Logistic),
            ModelChoice::Categorical => ModelDescriptor::new(Variant::Categorical),
            ModelChoice::Mixed => ModelDescriptor::new(Variant::Mixed),
        }
    }
}

/// A training run read from a JSON file.
///
/// Relative paths are resolved against the directory holding the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub model: ModelChoice,
    #[serde(default)]
    pub training: Config,
    pub dataset: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_out: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights_out: Option<PathBuf>,
}

impl RunConfig {
    /// Reads and validates a run configuration.
    ///
    /// # Errors
    /// Fails if the file cannot be read, is not a valid run configuration or
    /// its training section violates its bounds.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read run config {}", path.display()))?;

        let mut config = Self::from_json(&text)
            .with_context(|| format!("invalid run config {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve(base);
        }

        Ok(config)
    }

    /// Parses a run configuration from JSON text.
    ///
    /// # Errors
    /// Fails on malformed JSON or an invalid training section.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(text)?;
        config.training.validate()?;
        Ok(config)
    }

    /// Prints the effective configuration to stdout.
    pub fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }

    fn resolve(&mut self, base: &Path) {
        let paths = [
            Some(&mut self.dataset),
            self.model_out.as_mut(),
            self.weights_out.as_mut(),
        ];

        for path in paths.into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
