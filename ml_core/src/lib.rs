mod data;
mod error;
mod stats;
mod value;

pub use data::{DataError, Dataset, record_from_json};
pub use error::{MlError, Result};
pub use stats::TrainStats;
pub use value::{Outcome, Prediction, Record, Value};
