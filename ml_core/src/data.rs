use std::{error::Error, fmt};

use log::warn;

use crate::{Record, Value};

/// Errors produced while building or reading a dataset.
#[derive(Debug)]
pub enum DataError {
    /// The dataset text is not valid JSON.
    InvalidJson(serde_json::Error),

    /// The requested sample index is out of bounds.
    OutOfBounds { index: usize },

    /// A sample does not have the expected shape.
    InvalidSample { index: usize, msg: &'static str },

    /// The amount of inputs and outputs differ.
    LengthMismatch { inputs: usize, outputs: usize },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::InvalidJson(e) => write!(f, "invalid dataset json: {e}"),
            DataError::OutOfBounds { index } => write!(f, "sample index {index} is out of bounds"),
            DataError::InvalidSample { index, msg } => write!(f, "invalid sample {index}: {msg}"),
            DataError::LengthMismatch { inputs, outputs } => {
                write!(f, "dataset has {inputs} input(s) but {outputs} output(s)")
            }
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataError::InvalidJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

/// Converts a JSON object into a `Record`.
///
/// Fields holding `null`, arrays or nested objects cannot be coerced into a
/// feature, so they are skipped.
///
/// # Returns
/// `None` if `value` is not a JSON object.
pub fn record_from_json(value: &serde_json::Value) -> Option<Record> {
    let object = value.as_object()?;
    let mut record = Record::new();

    for (field, raw) in object {
        let value = match raw {
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(f)) => Value::Float(f),
                (None, None) => {
                    warn!("skipping field {field}: number {n} does not fit a float");
                    continue;
                }
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => {
                warn!("skipping field {field}: unsupported value {other}");
                continue;
            }
        };

        record.insert(field.clone(), value);
    }

    Some(record)
}

/// Paired input and output records used for training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    inputs: Vec<Record>,
    outputs: Vec<Record>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Errors
    /// Returns `DataError::LengthMismatch` if both sequences differ in length.
    pub fn new(inputs: Vec<Record>, outputs: Vec<Record>) -> Result<Self, DataError> {
        if inputs.len() != outputs.len() {
            return Err(DataError::LengthMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }

        Ok(Self { inputs, outputs })
    }

    /// Parses a dataset from JSON text.
    ///
    /// Two layouts are accepted, a list of samples
    /// `[{"input": {..}, "output": {..}}, ..]` or parallel lists
    /// `{"inputs": [..], "outputs": [..]}`.
    ///
    /// # Errors
    /// Returns a `DataError` if the text is not JSON or does not follow either layout.
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        let root: serde_json::Value = serde_json::from_str(text)?;

        if let Some(samples) = root.as_array() {
            let mut inputs = Vec::with_capacity(samples.len());
            let mut outputs = Vec::with_capacity(samples.len());

            for (index, sample) in samples.iter().enumerate() {
                let input = record_from_json(&sample["input"]).ok_or(DataError::InvalidSample {
                    index,
                    msg: "missing input object",
                })?;
                let output = record_from_json(&sample["output"]).ok_or(DataError::InvalidSample {
                    index,
                    msg: "missing output object",
                })?;

                inputs.push(input);
                outputs.push(output);
            }

            return Self::new(inputs, outputs);
        }

        let inputs = Self::records(&root["inputs"], "inputs must be a list of objects")?;
        let outputs = Self::records(&root["outputs"], "outputs must be a list of objects")?;
        Self::new(inputs, outputs)
    }

    fn records(value: &serde_json::Value, msg: &'static str) -> Result<Vec<Record>, DataError> {
        let list = value
            .as_array()
            .ok_or(DataError::InvalidSample { index: 0, msg })?;

        list.iter()
            .enumerate()
            .map(|(index, v)| record_from_json(v).ok_or(DataError::InvalidSample { index, msg }))
            .collect()
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Fetches a sample by index.
    ///
    /// # Errors
    /// Returns `DataError::OutOfBounds` if `index` is invalid.
    pub fn get(&self, index: usize) -> Result<(&Record, &Record), DataError> {
        match (self.inputs.get(index), self.outputs.get(index)) {
            (Some(input), Some(output)) => Ok((input, output)),
            _ => Err(DataError::OutOfBounds { index }),
        }
    }

    pub fn inputs(&self) -> &[Record] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Record] {
        &self.outputs
    }

    /// Consumes the dataset returning its inputs and outputs.
    pub fn into_parts(self) -> (Vec<Record>, Vec<Record>) {
        (self.inputs, self.outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn parses_sample_list_layout() {
        let text = r#"[
            {"input": {"x": 1}, "output": {"y": 2.0}},
            {"input": {"x": 2}, "output": {"y": 4.0}}
        ]"#;

        let dataset = Dataset::from_json(text).unwrap();
        assert_eq!(dataset.len(), 2);

        let (input, output) = dataset.get(1).unwrap();
        assert_eq!(input, &record! { "x" => 2 });
        assert_eq!(output, &record! { "y" => 4.0 });
    }

    #[test]
    fn parses_parallel_lists_layout() {
        let text = r#"{"inputs": [{"a": "red"}], "outputs": [{"b": true}]}"#;
        let dataset = Dataset::from_json(text).unwrap();

        assert_eq!(dataset.inputs(), &[record! { "a" => "red" }]);
        assert_eq!(dataset.outputs(), &[record! { "b" => true }]);
    }

    #[test]
    fn unsupported_fields_are_skipped() {
        let value = serde_json::json!({"x": 1, "n": null, "l": [1, 2], "o": {"k": 1}});
        let record = record_from_json(&value).unwrap();

        assert_eq!(record, record! { "x" => 1 });
    }

    #[test]
    fn rejects_mismatched_lists() {
        let text = r#"{"inputs": [{"x": 1}, {"x": 2}], "outputs": [{"y": 1}]}"#;

        assert!(matches!(
            Dataset::from_json(text),
            Err(DataError::LengthMismatch { inputs: 2, outputs: 1 })
        ));
    }

    #[test]
    fn rejects_samples_without_objects() {
        let text = r#"[{"input": {"x": 1}, "output": 3}]"#;

        assert!(matches!(
            Dataset::from_json(text),
            Err(DataError::InvalidSample { index: 0, .. })
        ));
    }

    #[test]
    fn get_out_of_bounds() {
        let dataset = Dataset::default();
        assert!(matches!(dataset.get(0), Err(DataError::OutOfBounds { index: 0 })));
    }
}
