//! Genotypes: concrete profiles bound to their schema.
//!
//! Genetic operators work on the sorted context list of a profile (see
//! [`Profile::contexts`]). Two genotypes of one schema have equally long,
//! position-aligned context lists, so uniform crossover is a per-position
//! coin flip and mutation is a per-position resample.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::{EvolveError, Result};
use crate::profile::{join_path, Context, Profile, Schema};

/// Resample attempts made by [`Genotype::mutate`] before giving up.
pub const DEFAULT_RESAMPLE_LIMIT: usize = 1_000;

/// One candidate profile with an optional fitness score.
///
/// Equality compares the profile and the schema (deeply), never the
/// fitness; this value equality is what tournament selection uses to keep
/// candidates distinct.
///
/// `clone()` is the copy operation: it produces an independent genotype
/// sharing the immutable schema.
#[derive(Debug, Clone)]
pub struct Genotype {
    schema: Arc<Schema>,
    profile: Profile,
    fitness: Option<f64>,
}

impl PartialEq for Genotype {
    fn eq(&self, other: &Self) -> bool {
        self.profile == other.profile && self.same_schema(other)
    }
}

impl Genotype {
    /// Samples a random genotype from `schema`.
    pub fn random<R: Rng>(schema: &Arc<Schema>, rng: &mut R) -> Self {
        Self {
            schema: Arc::clone(schema),
            profile: schema.instantiate(rng),
            fitness: None,
        }
    }

    /// Wraps an existing profile, checking that it has the schema's shape.
    pub fn from_profile(schema: Arc<Schema>, profile: Profile) -> Result<Self> {
        schema.check_shape(&profile)?;
        Ok(Self {
            schema,
            profile,
            fitness: None,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn into_profile(self) -> Profile {
        self.profile
    }

    /// The score assigned by the fitness collaborator, if any.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Whether both genotypes were built from equal schemas.
    pub fn same_schema(&self, other: &Genotype) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) || *self.schema == *other.schema
    }

    /// Sorted context list of the profile.
    pub fn contexts(&self) -> Vec<Context> {
        self.profile.contexts()
    }

    /// Mutates one uniformly chosen leaf to a different value.
    ///
    /// Same as [`mutate_bounded`](Self::mutate_bounded) with
    /// [`DEFAULT_RESAMPLE_LIMIT`].
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) -> Result<Context> {
        self.mutate_bounded(rng, DEFAULT_RESAMPLE_LIMIT)
    }

    /// Mutates one uniformly chosen leaf, resampling its domain until the
    /// new value differs from the old one.
    ///
    /// Returns the mutated locus with its new value. The mutation is
    /// destructive and clears the fitness; clone first to keep the parent.
    ///
    /// # Errors
    ///
    /// - [`EvolveError::DegenerateDomain`] if the chosen leaf's domain has
    ///   fewer than two distinct values, or no different value was drawn in
    ///   `max_attempts` tries. The genotype is left unchanged.
    /// - [`EvolveError::SchemaMismatch`] if the profile has drifted from the
    ///   schema's shape.
    pub fn mutate_bounded<R: Rng>(&mut self, rng: &mut R, max_attempts: usize) -> Result<Context> {
        self.schema.check_shape(&self.profile)?;
        let contexts = self.profile.contexts();
        let locus = contexts
            .choose(rng)
            .ok_or_else(|| EvolveError::SchemaMismatch("profile has no leaves".into()))?;
        let spec = self.schema.node_at(&locus.path).ok_or_else(|| {
            EvolveError::SchemaMismatch(format!("no spec for `{}`", join_path(&locus.path)))
        })?;
        if !spec.has_alternatives() {
            return Err(EvolveError::DegenerateDomain {
                path: join_path(&locus.path),
            });
        }

        for _ in 0..max_attempts {
            let Some(candidate) = spec.sample(rng) else {
                break;
            };
            if candidate != locus.value {
                log::trace!("mutating {locus} -> {candidate}");
                self.profile.replace_value(&locus.path, candidate.clone());
                self.fitness = None;
                return Ok(Context {
                    path: locus.path.clone(),
                    value: candidate,
                });
            }
        }

        log::warn!(
            "no distinct value for `{}` after {max_attempts} draws",
            join_path(&locus.path)
        );
        Err(EvolveError::DegenerateDomain {
            path: join_path(&locus.path),
        })
    }

    /// Uniform crossover with `mate`.
    ///
    /// Each aligned context is taken from `self` or `mate` with equal
    /// probability, and the chosen loci are rebuilt into a new profile.
    /// Every leaf of the result carries one parent's value at that path.
    /// Wrapping the profile into a genotype is left to the caller.
    ///
    /// # Errors
    ///
    /// [`EvolveError::SchemaMismatch`] if the genotypes come from different
    /// schemas or either profile does not have its schema's shape.
    pub fn uniform_crossover<R: Rng>(&self, mate: &Genotype, rng: &mut R) -> Result<Profile> {
        if !self.same_schema(mate) {
            return Err(EvolveError::SchemaMismatch(
                "crossover between genotypes of different schemas".into(),
            ));
        }
        self.schema.check_shape(&self.profile)?;
        self.schema.check_shape(&mate.profile)?;

        let ours = self.profile.contexts();
        let theirs = mate.profile.contexts();
        debug_assert_eq!(ours.len(), theirs.len());

        let chosen = ours.into_iter().zip(theirs).map(|(a, b)| {
            debug_assert_eq!(a.path, b.path);
            if rng.random_bool(0.5) {
                a
            } else {
                b
            }
        });
        Ok(Profile::from_contexts(chosen))
    }
}
