//! Evolutionary tuning of hierarchical slicer profiles.
//!
//! A slicer profile is a tree of named settings ("infill.density = 20").
//! This crate describes the admissible values of every setting with a
//! [`Schema`](profile::Schema) and evolves complete profiles with a
//! genetic algorithm whose fitness comes from outside: typically printing
//! each candidate and rating the result.
//!
//! - [`profile`]: values, schemas, profile trees and their flat
//!   [`Context`](profile::Context) view
//! - [`ga`]: genotypes, tournament selection and the population manager
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use evolve_profile::ga::{FitnessError, GaConfig, GeneticAlgorithm, Genotype, PerGenotype};
//! use evolve_profile::profile::{Schema, SchemaNode};
//!
//! let schema = Arc::new(Schema::new([
//!     ("layer_height", SchemaNode::float_range(0.1, 0.3)),
//!     ("infill", SchemaNode::group([
//!         ("density", SchemaNode::int_range(10, 40)),
//!         ("pattern", SchemaNode::choice(["grid", "gyroid", "cubic"])),
//!     ])),
//! ])?);
//!
//! let config = GaConfig::default().with_max_generations(3).with_seed(7);
//! let mut ga = GeneticAlgorithm::new(schema, config)?;
//! // stand-in for printing and rating each candidate
//! let mut rate = PerGenotype(|g: &Genotype| -> Result<f64, FitnessError> {
//!     Ok(g.contexts().len() as f64)
//! });
//! let result = ga.run(&mut rate)?;
//! assert_eq!(result.generations, 3);
//! # Ok::<(), evolve_profile::EvolveError>(())
//! ```

pub mod error;
pub mod ga;
pub mod profile;

pub use error::{EvolveError, Result};
