use crate::Config;

/// Gradient descent with an L2 penalty on coefficients.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
    regularize: f64,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken.
    /// * `regularize` - The L2 coefficient applied to non-bias weights.
    pub fn new(learning_rate: f64, regularize: f64) -> Self {
        Self {
            learning_rate,
            regularize,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.learning_rate, config.regularize)
    }

    /// Steps a coefficient against its gradient, shrinking it towards zero.
    pub fn update_weight(&self, weight: f64, grad: f64) -> f64 {
        weight - self.learning_rate * (grad + self.regularize * weight)
    }

    /// Steps a bias against its gradient, biases are not regularized.
    pub fn update_bias(&self, bias: f64, grad: f64) -> f64 {
        bias - self.learning_rate * grad
    }
}
