//! Trainer and predictor pairs, one module per model variant.
//!
//! Every trainer mutates a `Weights` store in place and every predictor reads
//! from one. Neither keeps state of its own between calls.

pub mod categorical;
pub mod linear;
pub mod logistic;
pub mod mixed;
mod regression;
