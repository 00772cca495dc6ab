use ml_core::{Prediction, Record, Result, TrainStats};

use super::regression::Regression;
use crate::{
    Config, Weights,
    arch::{activations::ActFn, loss::Mse},
};

fn regression(normalize: bool) -> Regression<Mse> {
    Regression {
        name: "linear",
        act_fn: ActFn::identity(),
        loss_fn: Mse::new(),
        normalize,
    }
}

/// Fits one linear regression per numeric target, minimizing the mean squared
/// error with batched gradient descent.
///
/// Every target of the first output record gets a coefficient per feature of
/// the first input record plus a bias. When `config.normalize` is set, the
/// gradient of a numeric feature is divided by that feature's mean.
///
/// # Arguments
/// * `inputs` - The feature records.
/// * `outputs` - The target records, aligned with `inputs`.
/// * `weights` - The store refined in place.
/// * `config` - The training hyper-parameters.
///
/// # Returns
/// The statistics of the run, `converged` is set if the loss settled below
/// `config.tolerance` before the last epoch.
pub fn train(
    inputs: &[Record],
    outputs: &[Record],
    weights: &mut Weights,
    config: &Config,
) -> Result<TrainStats> {
    regression(config.normalize).fit(inputs, outputs, weights, config)
}

/// Predicts every target present in `weights` as `bias + Σ w·x`.
pub fn predict(input: &Record, weights: &Weights) -> Prediction {
    regression(false).predict(input, weights)
}
