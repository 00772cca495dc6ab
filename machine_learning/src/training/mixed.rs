use log::info;
use ml_core::{MlError, Prediction, Record, Result, TrainStats, Value};

use super::{categorical, linear, logistic};
use crate::{Config, ModelDescriptor, TargetType, Weights};

/// Decides how a target is trained from one of its values.
///
/// Booleans and numbers that are exactly `0` or `1` are boolean targets, any
/// other number is numeric and text is categorical.
pub fn target_type(value: &Value) -> TargetType {
    match value {
        Value::Text(_) => TargetType::Categorical,
        v if v.is_boolean() || v.is_binary() => TargetType::Boolean,
        _ => TargetType::Numeric,
    }
}

/// Splits the outputs by target type and trains each part with the matching
/// trainer, all of them sharing `weights`.
///
/// Target types are decided from the first output record and stored in the
/// descriptor, which also receives the category indices of categorical
/// targets.
///
/// # Errors
/// Returns `MlError::InvalidOutput` if `outputs` is empty, or whatever error
/// a delegated trainer returns.
pub fn train(
    inputs: &[Record],
    outputs: &[Record],
    weights: &mut Weights,
    config: &Config,
    model: &mut ModelDescriptor,
) -> Result<TrainStats> {
    let Some(first_output) = outputs.first() else {
        return Err(MlError::InvalidOutput("no output records"));
    };

    let mut numeric_outputs = vec![Record::new(); outputs.len()];
    let mut boolean_outputs = vec![Record::new(); outputs.len()];
    let mut categorical_outputs = vec![Record::new(); outputs.len()];

    for (target, sample) in first_output {
        let kind = target_type(sample);
        model.set_target_type(target, kind);

        let bucket = match kind {
            TargetType::Numeric => &mut numeric_outputs,
            TargetType::Boolean => &mut boolean_outputs,
            TargetType::Categorical => &mut categorical_outputs,
        };

        for (split, output) in bucket.iter_mut().zip(outputs) {
            if let Some(value) = output.get(target) {
                split.insert(target.clone(), value.clone());
            }
        }
    }

    let count = |bucket: &[Record]| bucket.first().map_or(0, Record::len);
    info!(
        numeric = count(&numeric_outputs),
        boolean = count(&boolean_outputs),
        categorical = count(&categorical_outputs);
        "mixed targets found"
    );

    let mut stats: Option<TrainStats> = None;
    let mut merge = |part: TrainStats| {
        stats = Some(match stats {
            Some(acc) => acc.merge(part),
            None => part,
        });
    };

    if count(&numeric_outputs) > 0 {
        merge(linear::train(inputs, &numeric_outputs, weights, config)?);
    }

    if count(&boolean_outputs) > 0 {
        merge(logistic::train(inputs, &boolean_outputs, weights, config)?);
    }

    if count(&categorical_outputs) > 0 {
        merge(categorical::train(
            inputs,
            &categorical_outputs,
            weights,
            config,
            model.categories_mut(),
        )?);
    }

    Ok(stats.unwrap_or_default())
}

/// Runs every predictor and keeps, for each target, the output of the
/// predictor matching its recorded type.
///
/// Boolean targets are reported as `true` when their probability is at least
/// one half; categorical targets come with their `<target>_probs` distribution.
pub fn predict(input: &Record, weights: &Weights, model: &ModelDescriptor) -> Prediction {
    let mut linear_pred = linear::predict(input, weights);
    let logistic_pred = logistic::predict(input, weights);
    let mut categorical_pred = categorical::predict(input, weights, model.categories());

    let mut prediction = Prediction::new();

    for (target, kind) in model.target_types() {
        match kind {
            TargetType::Numeric => {
                if let Some(outcome) = linear_pred.remove(target) {
                    prediction.insert(target.clone(), outcome);
                }
            }
            TargetType::Boolean => {
                if let Some(p) = logistic_pred.get(target).and_then(|o| o.as_f64()) {
                    prediction.insert(target.clone(), Value::Bool(p >= 0.5).into());
                }
            }
            TargetType::Categorical => {
                let probs = format!("{target}{}", categorical::PROBS_SUFFIX);

                if let Some(outcome) = categorical_pred.remove(target) {
                    prediction.insert(target.clone(), outcome);
                }
                if let Some(outcome) = categorical_pred.remove(&probs) {
                    prediction.insert(probs, outcome);
                }
            }
        }
    }

    prediction
}
