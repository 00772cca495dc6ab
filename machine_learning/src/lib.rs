pub mod arch;
mod config;
mod engine;
mod model;
pub mod optimization;
pub mod selection;
pub mod training;
pub mod weights;

pub use config::Config;
pub use engine::Engine;
pub use ml_core::{MlError, Outcome, Prediction, Record, Result, TrainStats, Value, record};
pub use model::{CategoryIndex, ModelDescriptor, TargetType, Variant};
pub use weights::Weights;
