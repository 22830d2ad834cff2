//! Crate-wide error type.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrlError {
    #[error("allocation failed while mutating rule set")]
    Allocation,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("truncated-Poisson normalizer exhausted while computing prior (norm_constant <= 0)")]
    DegeneratePrior,
}

pub type Result<T> = std::result::Result<T, BrlError>;
