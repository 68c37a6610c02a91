//! The fitness collaborator contract.
//!
//! Fitness is acquired outside the engine: slicing each candidate profile,
//! printing it and rating the print. The engine only needs
//! [`FitnessCalculator`]: given an ordered batch of genotypes, return one
//! score per genotype in the same order, or fail the whole batch.
//!
//! Higher fitness is better (maximization).

use super::genotype::Genotype;

/// Scores a batch of genotypes.
///
/// # Contract
///
/// - The returned vector has exactly one finite score per input genotype,
///   in input order.
/// - Scoring completes for the entire batch before returning; there is no
///   partial credit. Any failure fails the batch.
///
/// # Implementing
///
/// ```ignore
/// struct AskOperator;
///
/// impl FitnessCalculator for AskOperator {
///     fn ascertain_fitness(&mut self, genotypes: &[Genotype]) -> Result<Vec<f64>, FitnessError> {
///         genotypes.iter().map(|g| prompt_for_score(g.profile())).collect()
///     }
/// }
/// ```
pub trait FitnessCalculator {
    fn ascertain_fitness(&mut self, genotypes: &[Genotype]) -> Result<Vec<f64>, FitnessError>;
}

impl<C: FitnessCalculator + ?Sized> FitnessCalculator for &mut C {
    fn ascertain_fitness(&mut self, genotypes: &[Genotype]) -> Result<Vec<f64>, FitnessError> {
        (**self).ascertain_fitness(genotypes)
    }
}

/// Failure reported by a fitness collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitnessError {
    /// An external tool (slicer, printer, rater) could not be reached.
    #[error("fitness source unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Failed(String),
    /// A batch was answered with the wrong number of scores.
    #[error("batch of {expected} genotypes received {actual} scores")]
    BatchSize { expected: usize, actual: usize },
    /// A score was `NaN` or infinite and cannot be ranked.
    #[error("genotype #{index} received non-finite score {score}")]
    NonFinite { index: usize, score: f64 },
}

/// Adapts a batch closure into a [`FitnessCalculator`].
pub struct FnFitness<F>(pub F);

impl<F> FitnessCalculator for FnFitness<F>
where
    F: FnMut(&[Genotype]) -> Result<Vec<f64>, FitnessError>,
{
    fn ascertain_fitness(&mut self, genotypes: &[Genotype]) -> Result<Vec<f64>, FitnessError> {
        (self.0)(genotypes)
    }
}

/// Scores genotypes one at a time with a closure.
pub struct PerGenotype<F>(pub F);

impl<F> FitnessCalculator for PerGenotype<F>
where
    F: FnMut(&Genotype) -> Result<f64, FitnessError>,
{
    fn ascertain_fitness(&mut self, genotypes: &[Genotype]) -> Result<Vec<f64>, FitnessError> {
        genotypes.iter().map(&mut self.0).collect()
    }
}

/// Splits a population into fixed-size batches for an inner calculator.
///
/// Physical evaluation prints several models per plate, one profile per
/// model; `batch_size` is the number of models on a plate. Each batch is
/// checked against the one-score-per-genotype contract before the scores
/// are concatenated in order.
pub struct Batched<C> {
    inner: C,
    batch_size: usize,
}

impl<C: FitnessCalculator> Batched<C> {
    /// Wraps `inner`. A `batch_size` of zero is treated as one.
    pub fn new(inner: C, batch_size: usize) -> Self {
        Self {
            inner,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: FitnessCalculator> FitnessCalculator for Batched<C> {
    fn ascertain_fitness(&mut self, genotypes: &[Genotype]) -> Result<Vec<f64>, FitnessError> {
        let mut scores = Vec::with_capacity(genotypes.len());
        for (i, batch) in genotypes.chunks(self.batch_size).enumerate() {
            let batch_scores = self.inner.ascertain_fitness(batch)?;
            if batch_scores.len() != batch.len() {
                return Err(FitnessError::BatchSize {
                    expected: batch.len(),
                    actual: batch_scores.len(),
                });
            }
            log::debug!("scored batch {i} ({} genotypes)", batch.len());
            scores.extend(batch_scores);
        }
        Ok(scores)
    }
}
