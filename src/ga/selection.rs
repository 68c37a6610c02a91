//! Tournament selection over a population slice.
//!
//! All functions return indices into the slice and draw from the caller's
//! random source. Candidates within one tournament are pairwise distinct
//! by value equality, not by position: duplicated genotypes count once.
//!
//! Every retry loop is bounded by `retry_limit` and reports
//! [`EvolveError::Stalled`] instead of spinning on a degenerate population.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use std::cmp::Ordering;

use rand::Rng;

use super::genotype::Genotype;
use crate::error::{EvolveError, Result};

/// Outcome of one tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tournament {
    /// Index of the fittest candidate; `None` for a size-0 tournament.
    pub winner: Option<usize>,
    /// Indices of every candidate that took part.
    pub candidates: Vec<usize>,
}

/// Orders genotypes by fitness, ascending. Unscored genotypes rank below
/// every scored one; incomparable scores (`NaN`) tie.
pub(crate) fn fitness_order(a: &Genotype, b: &Genotype) -> Ordering {
    match (a.fitness(), b.fitness()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Draws `k` pairwise-distinct genotypes by repeated uniform draws.
///
/// # Errors
///
/// - [`EvolveError::TournamentSize`] if `k >= population.len()`.
/// - [`EvolveError::Stalled`] if `retry_limit` consecutive draws for one
///   slot all hit genotypes already chosen (too few distinct individuals).
///
/// # Complexity
/// O(k²) comparisons per call, expected; intended for `k` much smaller than
/// the population.
pub fn sample_distinct<R: Rng>(
    population: &[Genotype],
    k: usize,
    rng: &mut R,
    retry_limit: usize,
) -> Result<Vec<usize>> {
    let n = population.len();
    if k >= n {
        return Err(EvolveError::TournamentSize {
            requested: k,
            population: n,
        });
    }

    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    for _ in 0..k {
        let mut attempts = 0;
        loop {
            let idx = rng.random_range(0..n);
            if !chosen.iter().any(|&c| population[c] == population[idx]) {
                chosen.push(idx);
                break;
            }
            attempts += 1;
            if attempts >= retry_limit {
                log::warn!("distinct sampling gave up: {} of {k} drawn", chosen.len());
                return Err(EvolveError::Stalled {
                    operation: "distinct sampling",
                    attempts,
                });
            }
        }
    }
    Ok(chosen)
}

/// Runs one tournament of size `k`.
///
/// `k == 0` means no tournament: there is no winner and the whole
/// population is the candidate pool. Otherwise `k` distinct candidates are
/// drawn, stably sorted ascending by fitness, and the last one wins, so
/// among tied maxima the one drawn last wins.
pub fn best_of<R: Rng>(
    population: &[Genotype],
    k: usize,
    rng: &mut R,
    retry_limit: usize,
) -> Result<Tournament> {
    if k == 0 {
        return Ok(Tournament {
            winner: None,
            candidates: (0..population.len()).collect(),
        });
    }

    let candidates = sample_distinct(population, k, rng, retry_limit)?;
    let mut ranked = candidates.clone();
    ranked.sort_by(|&a, &b| fitness_order(&population[a], &population[b]));
    Ok(Tournament {
        winner: ranked.last().copied(),
        candidates,
    })
}

/// Selects two value-distinct parents by two tournaments of size `k`.
///
/// The second tournament is rerun while its winner equals the first.
///
/// # Errors
///
/// - [`EvolveError::TournamentSize`] if `k` is zero or not smaller than the
///   population.
/// - [`EvolveError::Stalled`] if the same genotype keeps winning, e.g. when
///   duplicates of the fittest individual crowd the population.
pub fn select_pair<R: Rng>(
    population: &[Genotype],
    k: usize,
    rng: &mut R,
    retry_limit: usize,
) -> Result<(usize, usize)> {
    let first = winner(population, k, rng, retry_limit)?;
    for _ in 0..retry_limit {
        let second = winner(population, k, rng, retry_limit)?;
        if population[second] != population[first] {
            return Ok((first, second));
        }
    }
    log::warn!("pair selection gave up: the same genotype keeps winning");
    Err(EvolveError::Stalled {
        operation: "pair selection",
        attempts: retry_limit,
    })
}

/// Winner of a size-`k` tournament; `k == 0` is rejected since it has none.
pub(crate) fn winner<R: Rng>(
    population: &[Genotype],
    k: usize,
    rng: &mut R,
    retry_limit: usize,
) -> Result<usize> {
    best_of(population, k, rng, retry_limit)?
        .winner
        .ok_or(EvolveError::TournamentSize {
            requested: k,
            population: population.len(),
        })
}
