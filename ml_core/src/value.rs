use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// A single training or inference example, keyed by field name.
pub type Record = BTreeMap<String, Value>;

/// The result of a prediction, keyed by target name.
pub type Prediction = BTreeMap<String, Outcome>;

/// A field value of a `Record`.
///
/// Records arrive heterogeneous at the boundary; every algorithm works on this
/// closed set of cases and never on the raw representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Whether the value is an integer or a float.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Whether the value is a number that is exactly `0` or `1`.
    pub fn is_binary(&self) -> bool {
        match self {
            Value::Int(v) => *v == 0 || *v == 1,
            Value::Float(v) => *v == 0.0 || *v == 1.0,
            _ => false,
        }
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Coerces the value into a trainable feature.
    ///
    /// Numbers keep their value and booleans map to `1.0`/`0.0`. Text is
    /// one-hot encoded against the name of the field it is stored under: it
    /// becomes `1.0` only when the text equals `field`.
    ///
    /// # Arguments
    /// * `field` - The name of the field holding this value.
    pub fn to_feature(&self, field: &str) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Text(s) if s == field => 1.0,
            Value::Text(_) => 0.0,
        }
    }

    /// Coerces the value into a regression/classification target.
    ///
    /// # Returns
    /// The numeric value, `1.0`/`0.0` for booleans, or `None` for text.
    pub fn to_target(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => self.as_f64(),
        }
    }

    /// Best-effort boolean reading of the value.
    ///
    /// Non-zero numbers and the strings `"true"`, `"yes"` and `"1"` are true.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Text(s) => matches!(s.as_str(), "true" | "yes" | "1"),
        }
    }

    /// The textual representation used as a category label.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Reads a category label back into a value, turning numeric-looking labels
    /// into numbers and leaving everything else as text.
    pub fn from_label(label: &str) -> Value {
        if let Ok(v) = label.parse::<i64>() {
            return Value::Int(v);
        }

        let numeric_looking = label.bytes().any(|b| b.is_ascii_digit());
        match label.parse::<f64>() {
            Ok(v) if numeric_looking && v.is_finite() => Value::Float(v),
            _ => Value::Text(label.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// One predicted field: either a plain value or a probability distribution
/// over category labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Value(Value),
    Distribution(BTreeMap<String, f64>),
}

impl Outcome {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Distribution(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_value()? {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_distribution(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Outcome::Distribution(d) => Some(d),
            Outcome::Value(_) => None,
        }
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Value(value)
    }
}

/// Builds a `Record` from `field => value` pairs.
///
/// ```
/// let r = ml_core::record! { "size" => 1000, "location" => "urban" };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.insert(::std::string::String::from($field), $crate::Value::from($value));)+
        record
    }};
}
