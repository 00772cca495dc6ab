use std::collections::BTreeMap;

use log::{Level, debug, info, log_enabled, trace, warn};
use ml_core::{MlError, Outcome, Prediction, Record, Result, TrainStats, Value};

use crate::{
    Config, Weights,
    arch::{activations::ActFn, loss::LossFn},
    optimization::GradientDescent,
    weights::{bias_key, coefficient_key},
};

const LOG_EVERY: usize = 1000;

/// The weight keys of one target, in feature order.
struct TargetKeys<'a> {
    target: &'a str,
    coefficients: Vec<String>,
    bias: String,
}

/// A single-output generalized linear model trained with batched gradient
/// descent, one scalar output per target field.
pub(super) struct Regression<L: LossFn> {
    pub name: &'static str,
    pub act_fn: ActFn,
    pub loss_fn: L,
    pub normalize: bool,
}

impl<L: LossFn> Regression<L> {
    /// Fits every target of `outputs` against every feature of `inputs`.
    ///
    /// Feature and target names are taken from the first input and output
    /// records. Weights that do not exist yet are created as zero, existing
    /// ones are refined in place.
    pub fn fit(
        &self,
        inputs: &[Record],
        outputs: &[Record],
        weights: &mut Weights,
        config: &Config,
    ) -> Result<TrainStats> {
        let Some(first_input) = inputs.first() else {
            return Err(MlError::EmptyTrainingSet);
        };
        let Some(first_output) = outputs.first() else {
            return Err(MlError::InvalidOutput("no output records"));
        };

        let features: Vec<&str> = first_input.keys().map(String::as_str).collect();
        let targets: Vec<TargetKeys> = first_output
            .keys()
            .map(|target| TargetKeys {
                target: target.as_str(),
                coefficients: features.iter().map(|f| coefficient_key(f, target)).collect(),
                bias: bias_key(target),
            })
            .collect();

        for keys in &targets {
            keys.coefficients.iter().for_each(|k| weights.ensure(k.as_str()));
            weights.ensure(keys.bias.as_str());
        }

        info!(
            "training {} model with features {features:?} and targets {:?}",
            self.name,
            first_output.keys().collect::<Vec<_>>()
        );

        let scales = if self.normalize {
            feature_means(inputs, &features)
        } else {
            BTreeMap::new()
        };

        if log_enabled!(Level::Debug) {
            for (feature, mean) in &scales {
                debug!("feature {feature} mean: {mean}");
            }
            for keys in &targets {
                if let Some(mean) = target_mean(outputs, keys.target) {
                    debug!("target {} mean: {mean}", keys.target);
                }
            }
        }

        let optimizer = GradientDescent::from_config(config);
        let batch_size = config.batch_size.get();

        let mut prev_loss = self.loss(inputs, outputs, weights, &features, &targets);
        let mut loss = prev_loss;
        let mut epochs = 0;
        let mut converged = false;

        for epoch in 0..config.epochs.get() {
            for (i, (batch_x, batch_y)) in inputs
                .chunks(batch_size)
                .zip(outputs.chunks(batch_size))
                .enumerate()
            {
                trace!("epoch {epoch} batch {i}: {} sample(s)", batch_x.len());

                for keys in &targets {
                    self.step(batch_x, batch_y, keys, &features, &scales, weights, &optimizer);
                }
            }

            epochs = epoch + 1;
            loss = self.loss(inputs, outputs, weights, &features, &targets);

            if epoch % LOG_EVERY == 0 {
                debug!(epoch = epoch, loss = loss; "{} training", self.name);
            }

            if let Some((key, _)) = weights.iter().find(|(_, w)| !w.is_finite()) {
                warn!(epoch = epoch; "{} training diverged at weight {key}, stopping", self.name);
                break;
            }

            if (prev_loss - loss).abs() < config.tolerance {
                converged = true;
                break;
            }

            prev_loss = loss;
        }

        info!(
            epochs = epochs, loss = loss, converged = converged;
            "{} training finished", self.name
        );

        Ok(TrainStats::new(epochs, loss, converged))
    }

    /// Runs one gradient step over a batch for a single target.
    ///
    /// Coefficients are updated one feature at a time and the bias last, each
    /// gradient is measured against the weights as already updated.
    #[allow(clippy::too_many_arguments)]
    fn step(
        &self,
        batch_x: &[Record],
        batch_y: &[Record],
        keys: &TargetKeys,
        features: &[&str],
        scales: &BTreeMap<&str, f64>,
        weights: &mut Weights,
        optimizer: &GradientDescent,
    ) {
        let n = batch_x.len() as f64;

        for (feature, key) in features.iter().zip(&keys.coefficients) {
            let mut grad = 0.0;

            for (x, y) in batch_x.iter().zip(batch_y) {
                let Some(value) = x.get(*feature) else {
                    continue;
                };
                let Some(actual) = y.get(keys.target).and_then(Value::to_target) else {
                    continue;
                };

                let y_pred = self.act_fn.f(combination(x, features, keys, weights));
                grad += self.loss_fn.loss_prime(y_pred, actual) * scaled(value, feature, scales);
            }

            let w = weights.value(key);
            weights.set(key.as_str(), optimizer.update_weight(w, grad / n));
        }

        let mut grad = 0.0;
        for (x, y) in batch_x.iter().zip(batch_y) {
            let Some(actual) = y.get(keys.target).and_then(Value::to_target) else {
                continue;
            };

            let y_pred = self.act_fn.f(combination(x, features, keys, weights));
            grad += self.loss_fn.loss_prime(y_pred, actual);
        }

        let b = weights.value(&keys.bias);
        weights.set(keys.bias.as_str(), optimizer.update_bias(b, grad / n));
    }

    /// Mean loss over every (sample, target) pair with a usable target value.
    fn loss(
        &self,
        inputs: &[Record],
        outputs: &[Record],
        weights: &Weights,
        features: &[&str],
        targets: &[TargetKeys],
    ) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;

        for (x, y) in inputs.iter().zip(outputs) {
            for keys in targets {
                let Some(actual) = y.get(keys.target).and_then(Value::to_target) else {
                    continue;
                };

                let y_pred = self.act_fn.f(combination(x, features, keys, weights));
                total += self.loss_fn.loss(y_pred, actual);
                count += 1;
            }
        }

        if count == 0 { 0.0 } else { total / count as f64 }
    }

    /// Predicts every target found in the weight keys.
    ///
    /// Fields of `input` without a matching weight contribute nothing.
    pub fn predict(&self, input: &Record, weights: &Weights) -> Prediction {
        weights
            .targets()
            .into_iter()
            .map(|target| {
                let mut z = weights.get(&bias_key(target)).unwrap_or_default();

                for (field, value) in input {
                    if let Some(w) = weights.get(&coefficient_key(field, target)) {
                        z += w * value.to_feature(field);
                    }
                }

                (target.to_string(), Outcome::Value(Value::Float(self.act_fn.f(z))))
            })
            .collect()
    }
}

/// The linear combination of the training features of `x` for one target.
fn combination(x: &Record, features: &[&str], keys: &TargetKeys, weights: &Weights) -> f64 {
    let z: f64 = features
        .iter()
        .zip(&keys.coefficients)
        .filter_map(|(feature, key)| Some(weights.value(key) * x.get(*feature)?.to_feature(feature)))
        .sum();

    z + weights.value(&keys.bias)
}

/// The gradient factor of a feature value, numeric values are divided by the
/// feature mean when one is known and non-zero.
fn scaled(value: &Value, feature: &str, scales: &BTreeMap<&str, f64>) -> f64 {
    match (value.as_f64(), scales.get(feature)) {
        (Some(v), Some(&mean)) if mean != 0.0 => v / mean,
        _ => value.to_feature(feature),
    }
}

/// Mean of every numeric feature over the samples where it is numeric.
fn feature_means<'a>(inputs: &[Record], features: &[&'a str]) -> BTreeMap<&'a str, f64> {
    features
        .iter()
        .filter_map(|&feature| {
            let values: Vec<f64> = inputs
                .iter()
                .filter_map(|x| x.get(feature)?.as_f64())
                .collect();

            (!values.is_empty()).then(|| (feature, values.iter().sum::<f64>() / values.len() as f64))
        })
        .collect()
}

fn target_mean(outputs: &[Record], target: &str) -> Option<f64> {
    let values: Vec<f64> = outputs
        .iter()
        .filter_map(|y| y.get(target)?.as_f64())
        .collect();

    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use ml_core::record;

    use super::*;

    #[test]
    fn means_only_count_numeric_values() {
        let inputs = [
            record! { "x" => 1, "c" => "a", "b" => true },
            record! { "x" => 3.0, "c" => "b", "b" => false },
            record! { "c" => "c" },
        ];
        let means = feature_means(&inputs, &["b", "c", "x"]);

        assert_eq!(means.len(), 1);
        assert_eq!(means["x"], 2.0);
    }

    #[test]
    fn scaling_skips_zero_means_and_non_numeric_values() {
        let scales = BTreeMap::from([("x", 2.0), ("z", 0.0)]);

        assert_eq!(scaled(&Value::Int(4), "x", &scales), 2.0);
        assert_eq!(scaled(&Value::Int(4), "z", &scales), 4.0);
        assert_eq!(scaled(&Value::Bool(true), "x", &scales), 1.0);
        assert_eq!(scaled(&Value::from("x"), "x", &scales), 1.0);
    }
}
