//! Error types for safe prime generation

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafePrimeError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("No {bit_length}-bit safe prime found after {iterations} candidates")]
    GenerationExhausted { bit_length: u64, iterations: u64 },

    #[error("Safe prime search cancelled")]
    Cancelled,

    #[error("Worker thread panicked")]
    WorkerPanicked,

    #[error("Could not start worker thread: {0}")]
    ThreadSpawn(String),
}

impl From<rand::Error> for SafePrimeError {
    fn from(err: rand::Error) -> Self {
        SafePrimeError::EntropyUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SafePrimeError>;
