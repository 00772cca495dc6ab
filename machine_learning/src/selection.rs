use log::debug;
use ml_core::{Record, Value};

use crate::Variant;

/// The broad kind of an output value, as far as model selection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Binary,
    Numeric,
}

/// Floats are always numeric here: a sample written as `1.0` reads as a
/// measured quantity, while `1` or `true` reads as a flag.
fn kind(value: &Value) -> Kind {
    match value {
        Value::Text(_) => Kind::Text,
        Value::Bool(_) | Value::Int(0 | 1) => Kind::Binary,
        Value::Int(_) | Value::Float(_) => Kind::Numeric,
    }
}

/// Picks the model variant suited to a sample output record.
///
/// Outputs combining at least two of text, boolean (or integer `0`/`1`) and
/// other numeric values need a mixed model. Otherwise text outputs are
/// categorical, other numeric outputs are linear and the rest is logistic,
/// which is also the choice for an empty sample.
pub fn select_variant(output_sample: &Record) -> Variant {
    let has = |k: Kind| output_sample.values().any(|v| kind(v) == k);
    let (text, binary, numeric) = (has(Kind::Text), has(Kind::Binary), has(Kind::Numeric));

    let variant = match (text, binary, numeric) {
        (true, true, _) | (true, _, true) | (_, true, true) => Variant::Mixed,
        (true, false, false) => Variant::Categorical,
        (false, false, true) => Variant::Linear,
        _ => Variant::Logistic,
    };

    debug!("selected {variant} model for output fields {:?}", output_sample.keys());
    variant
}
