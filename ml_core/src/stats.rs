/// Statistics produced by a single training call.
///
/// This type keeps fields private to allow evolving the internal counters
/// without breaking the public API.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainStats {
    epochs: usize,
    loss: f64,
    converged: bool,
}

impl TrainStats {
    /// Creates a new `TrainStats`.
    ///
    /// # Args
    /// * `epochs` - Number of epochs run before returning.
    /// * `loss` - The training loss measured after the last epoch.
    /// * `converged` - Whether training stopped early because the loss settled.
    pub fn new(epochs: usize, loss: f64, converged: bool) -> Self {
        Self {
            epochs,
            loss,
            converged,
        }
    }

    /// Returns the number of epochs run.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Returns the loss after the last epoch.
    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Returns whether the tolerance check stopped training early.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Combines the statistics of trainers that ran over disjoint targets.
    ///
    /// The longest run and the summed loss are kept; the result converged only
    /// if both parts did.
    pub fn merge(self, other: TrainStats) -> TrainStats {
        TrainStats {
            epochs: self.epochs.max(other.epochs),
            loss: self.loss + other.loss,
            converged: self.converged && other.converged,
        }
    }
}
