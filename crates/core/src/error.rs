use thiserror::Error;

/// Errors that can occur in the Fractal Monte Carlo system
#[derive(Error, Debug)]
pub enum FractalError {
    #[error("lookahead depth must be positive, got {0}")]
    InvalidLookahead(usize),

    #[error("walker population must have at least one walker")]
    EmptyPopulation,

    #[error("root embedding has length {actual}, dynamics model expects {expected}")]
    EmbeddingMismatch { expected: usize, actual: usize },
}

/// Convenience Result type for Fractal Monte Carlo operations
pub type Result<T> = std::result::Result<T, FractalError>;
