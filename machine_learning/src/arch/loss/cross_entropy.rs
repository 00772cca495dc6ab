use super::LossFn;

/// Categorical cross-entropy of the probability given to the true category.
///
/// `y_pred` is the softmax probability of the true category and `y` its
/// indicator, so the loss is only measured for `y == 1`.
#[derive(Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: f64, y: f64) -> f64 {
        -y * y_pred.max(f64::MIN_POSITIVE).ln()
    }

    fn loss_prime(&self, y_pred: f64, y: f64) -> f64 {
        y_pred - y
    }
}
