use super::LossFn;

/// Mean squared error loss function.
#[derive(Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: f64, y: f64) -> f64 {
        (y_pred - y).powi(2)
    }

    fn loss_prime(&self, y_pred: f64, y: f64) -> f64 {
        y_pred - y
    }
}
