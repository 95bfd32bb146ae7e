//! Fractal Core - Model contracts and common types
//!
//! This crate defines the interfaces between the Fractal Monte Carlo search
//! and the learned models it plans over. The search never sees model
//! internals; it only consumes these traits.
//!
//! # Types
//!
//! - [`DynamicsModel`] - Batched transition model owning the walker hidden state
//! - [`PredictionModel`] - Batched value (and optional policy) head
//! - [`RepresentationModel`] - Maps a raw observation to a root embedding
//! - [`Prediction`] - Output of a prediction model forward pass

mod error;
mod model;

pub use error::{FractalError, Result};
pub use model::{DynamicsModel, Prediction, PredictionModel, RepresentationModel};
