//! Inference-time planning for a FractalZero-style agent.
//!
//! This crate glues a representation model to the FMC search: an
//! observation is encoded to a root embedding, the search plans over the
//! dynamics model's hidden state for a fixed lookahead, and the selected
//! root action comes back with the aggregate root value estimate.

mod planner;

pub use planner::Planner;
