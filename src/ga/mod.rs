//! Genetic algorithm over slicer profiles.
//!
//! A population of [`Genotype`]s, each a complete profile of one shared
//! [`Schema`](crate::profile::Schema), is evolved against an external
//! [`FitnessCalculator`]. Every generation scores the population, culls it
//! to its fitter half and regenerates it by tournament-selected crossover
//! and mutation.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, rates, tournament size)
//! - [`Genotype`]: A profile plus its fitness, with mutation and uniform crossover
//! - [`GeneticAlgorithm`]: Owns the population and executes the evolutionary loop
//! - [`GaResult`]: Final result with the best-fitness history
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"

mod config;
mod genotype;
mod runner;
pub mod selection;
mod types;

pub use config::{ConfigError, GaConfig};
pub use genotype::{Genotype, DEFAULT_RESAMPLE_LIMIT};
pub use runner::{GaResult, GeneticAlgorithm, GenerationStats};
pub use selection::Tournament;
pub use types::{Batched, FitnessCalculator, FitnessError, FnFitness, PerGenotype};
