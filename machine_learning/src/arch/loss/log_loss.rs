use super::LossFn;

const CLIP_LOW: f64 = 1e-4;
const CLIP_HIGH: f64 = 0.9999;

/// Binary cross-entropy of a sigmoid output.
///
/// Predictions are clipped to `[1e-4, 0.9999]` before taking logarithms.
#[derive(Default, Clone, Copy)]
pub struct LogLoss;

impl LogLoss {
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for LogLoss {
    fn loss(&self, y_pred: f64, y: f64) -> f64 {
        let p = y_pred.clamp(CLIP_LOW, CLIP_HIGH);
        -(y * p.ln() + (1. - y) * (1. - p).ln())
    }

    fn loss_prime(&self, y_pred: f64, y: f64) -> f64 {
        y_pred - y
    }
}
