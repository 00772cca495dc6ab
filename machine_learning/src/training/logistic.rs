use ml_core::{Prediction, Record, Result, TrainStats};

use super::regression::Regression;
use crate::{
    Config, Weights,
    arch::{activations::ActFn, loss::LogLoss},
};

fn regression() -> Regression<LogLoss> {
    Regression {
        name: "logistic",
        act_fn: ActFn::sigmoid(),
        loss_fn: LogLoss::new(),
        normalize: false,
    }
}

/// Fits one logistic regression per binary target, minimizing the clipped log
/// loss with batched gradient descent.
///
/// Boolean targets train as `1`/`0`; features are never normalized.
///
/// # Returns
/// The statistics of the run.
pub fn train(
    inputs: &[Record],
    outputs: &[Record],
    weights: &mut Weights,
    config: &Config,
) -> Result<TrainStats> {
    regression().fit(inputs, outputs, weights, config)
}

/// Predicts the probability of every target present in `weights` as
/// `σ(bias + Σ w·x)`.
pub fn predict(input: &Record, weights: &Weights) -> Prediction {
    regression().predict(input, weights)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use ml_core::record;

    use super::*;

    #[test]
    fn separates_two_classes() {
        let inputs = [
            record! { "hours" => 1.0 },
            record! { "hours" => 2.0 },
            record! { "hours" => 8.0 },
            record! { "hours" => 9.0 },
        ];
        let outputs = [
            record! { "pass" => false },
            record! { "pass" => false },
            record! { "pass" => true },
            record! { "pass" => true },
        ];
        let config = Config {
            learning_rate: 0.1,
            epochs: NonZeroUsize::new(2000).unwrap(),
            tolerance: 0.0,
            ..Config::default()
        };
        let mut weights = Weights::new();

        train(&inputs, &outputs, &mut weights, &config).unwrap();

        let low = predict(&record! { "hours" => 1.0 }, &weights)["pass"].as_f64().unwrap();
        let high = predict(&record! { "hours" => 9.0 }, &weights)["pass"].as_f64().unwrap();
        assert!(low < 0.5 && high > 0.5, "low {low}, high {high}");
    }

    #[test]
    fn untrained_weights_predict_one_half() {
        let mut weights = Weights::new();
        weights.ensure("x->y");
        weights.ensure("bias->y");

        let p = predict(&record! { "x" => 5.0 }, &weights)["y"].as_f64().unwrap();
        assert_eq!(p, 0.5);
    }
}
