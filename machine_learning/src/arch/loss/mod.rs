mod cross_entropy;
mod log_loss;
mod loss_fn;
mod mse;

pub use cross_entropy::CrossEntropy;
pub use log_loss::LogLoss;
pub use loss_fn::LossFn;
pub use mse::Mse;
