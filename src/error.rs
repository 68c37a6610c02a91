//! Error taxonomy shared by the profile and GA modules.
//!
//! Every variant is a precondition violation or an exhausted retry bound.
//! None of them are retried internally; they abort the current operation
//! and are handed back to the caller.

use crate::ga::{ConfigError, FitnessError};

/// Errors raised while building schemas or evolving a population.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvolveError {
    /// A tournament or distinct sample cannot be drawn from the population.
    #[error("tournament size {requested} is invalid for a population of {population}")]
    TournamentSize { requested: usize, population: usize },

    /// Genotypes from different schemas were combined, or a profile does
    /// not have the shape of its schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Mutation hit a leaf that cannot produce a different value.
    #[error("degenerate domain at `{path}`: no distinct value could be drawn")]
    DegenerateDomain { path: String },

    /// A bounded retry loop ran out of attempts.
    #[error("{operation} stalled after {attempts} attempts")]
    Stalled {
        operation: &'static str,
        attempts: usize,
    },

    /// A schema leaf was declared with an unusable domain.
    #[error("invalid spec at `{path}`: {reason}")]
    InvalidSpec { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("fitness evaluation failed: {0}")]
    Fitness(#[from] FitnessError),

    /// The fitness collaborator broke the one-score-per-genotype contract.
    #[error("fitness calculator returned {actual} scores for {expected} genotypes")]
    FitnessCount { expected: usize, actual: usize },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EvolveError>;
