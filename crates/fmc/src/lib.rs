//! Fractal Monte Carlo search over a learned dynamics model.
//!
//! FMC is a population-based, vectorized alternative to MCTS: a batch of
//! "walkers" share a batched hidden state inside a dynamics model, and each
//! search iteration advances all of them at once, scores them with a value
//! model, and stochastically clones better walkers' full state onto worse
//! ones. No explicit tree is ever built; credit assignment happens through a
//! masked backward scan over each walker's reward history.
//!
//! # Features
//!
//! - **Generic**: Works with any `fractal_core::DynamicsModel` /
//!   `PredictionModel` pair
//! - **Vectorized**: Every phase operates on the whole population as
//!   `ndarray` batched operations
//! - **Reproducible**: All randomness flows through one caller-supplied RNG
//! - **Observable**: Optional [`SearchObserver`]s receive per-iteration
//!   statistics and clone decisions without affecting the search
//!
//! # Example
//!
//! ```
//! use fractal_fmc::{Fmc, FmcConfig};
//! use fractal_fmc::toy::{LinearDynamics, SumValue};
//! use ndarray::Array1;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = FmcConfig::with_walkers(16);
//! let dynamics = LinearDynamics::new(4);
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let mut fmc = Fmc::new(config, dynamics, SumValue, rng);
//!
//! let root = Array1::zeros(4);
//! let result = fmc.simulate(root.view(), 8).unwrap();
//! println!("selected action: {}", result.best_action);
//! println!("root value: {}", result.root_value);
//! ```

pub mod cloning;
pub mod config;
pub mod lineage;
pub mod observer;
pub mod search;
pub mod toy;
pub mod walkers;

pub use config::{BackupPolicy, FmcConfig};
pub use observer::{MetricsLogger, NoopObserver, SearchObserver};
pub use search::{Fmc, SearchResult};
pub use walkers::WalkerBatch;
