//! Crate-wide error type.

/// Errors surfaced by design construction, switches, criteria and engines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The FIP vector is empty, has an entry outside (0, 1], or its sum
    /// does not match the declared sample size.
    #[error("invalid inclusion probabilities: {0}")]
    InvalidInclusionProbabilities(String),

    /// A switch would break unit lengths, column capacity, or the
    /// projection disjointness of a unit's segments.
    #[error("infeasible switch: {0}")]
    InfeasibleSwitch(String),

    /// A column layout violates capacity, unit length, or projection
    /// disjointness.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Auxiliary data does not line up with the population.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length (usually the population size).
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },

    /// An engine or clustering configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
