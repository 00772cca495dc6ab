pub trait LossFn {
    /// The loss of a single prediction.
    fn loss(&self, y_pred: f64, y: f64) -> f64;

    /// The derivative of the loss with respect to the linear combination that
    /// produced `y_pred`.
    fn loss_prime(&self, y_pred: f64, y: f64) -> f64;
}
