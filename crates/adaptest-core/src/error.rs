//! Core error types.
//!
//! The numeric core never fails on bad numbers (it clamps instead). These
//! errors cover the two places where a caller's input is actually rejected:
//! session configuration and, under the strict policy, difficulty labels.

use thiserror::Error;

/// Errors raised by the adaptive-testing core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatError {
    /// The session configuration violates its constraints.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    /// A difficulty label is not one of A1..C2 and the policy is strict.
    #[error("unknown difficulty level: '{0}'")]
    UnknownLevel(String),

    /// A numeric difficulty is NaN or infinite and the policy is strict.
    #[error("non-finite difficulty value: {0}")]
    NonFiniteDifficulty(f64),
}
