//! Population management and the generation loop.
//!
//! [`GeneticAlgorithm`] owns the population and the random source and
//! drives each generation: ascertain fitness → cull → regenerate.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::GaConfig;
use super::genotype::Genotype;
use super::selection::{self, fitness_order, Tournament};
use super::types::{FitnessCalculator, FitnessError};
use crate::error::{EvolveError, Result};
use crate::profile::Schema;

/// Summary of one completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// 1-based generation number.
    pub generation: usize,

    /// Highest fitness scored this generation.
    pub best_fitness: f64,

    /// Mean fitness of the scored population.
    pub mean_fitness: f64,

    /// Children created by regeneration.
    pub children: usize,
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The fittest genotype of the final, scored population.
    pub best: Genotype,

    /// Best fitness (same as `best.fitness()`).
    pub best_fitness: f64,

    /// Number of generations executed.
    pub generations: usize,

    /// Best fitness of each scored population, the final one included.
    pub fitness_history: Vec<f64>,
}

/// The evolutionary engine.
///
/// Holds a population of `population_size` genotypes of one schema.
/// Fitness is higher-is-better and comes from an external
/// [`FitnessCalculator`]. All randomness (sampling, tournaments, operator
/// rates) is drawn from one seeded `StdRng`.
///
/// # Usage
///
/// ```ignore
/// let schema = Arc::new(Schema::new([...])?);
/// let mut ga = GeneticAlgorithm::new(schema, GaConfig::default().with_seed(42))?;
/// let result = ga.run(&mut print_and_rate)?;
/// println!("best profile: {:?}", result.best.profile());
/// ```
pub struct GeneticAlgorithm {
    schema: Arc<Schema>,
    config: GaConfig,
    population: Vec<Genotype>,
    rng: StdRng,
    generation: usize,
}

impl GeneticAlgorithm {
    /// Creates an engine with a fully random initial population.
    pub fn new(schema: Arc<Schema>, config: GaConfig) -> Result<Self> {
        Self::with_seeds(schema, config, Vec::new())
    }

    /// Creates an engine whose population starts with `seeds`.
    ///
    /// Seeds beyond `population_size` are dropped; missing slots are filled
    /// with random genotypes.
    ///
    /// # Errors
    ///
    /// [`EvolveError::Config`] for an invalid configuration,
    /// [`EvolveError::SchemaMismatch`] if a seed was built from another
    /// schema or does not have its shape.
    pub fn with_seeds(schema: Arc<Schema>, config: GaConfig, seeds: Vec<Genotype>) -> Result<Self> {
        config.validate()?;

        let mut population = seeds;
        population.truncate(config.population_size);
        for seed in &population {
            if **seed.schema() != *schema {
                return Err(EvolveError::SchemaMismatch(
                    "seed genotype was built from a different schema".into(),
                ));
            }
            schema.check_shape(seed.profile())?;
        }

        let mut rng = create_rng(config.seed.unwrap_or_else(rand::random));
        let seeded = population.len();
        while population.len() < config.population_size {
            population.push(Genotype::random(&schema, &mut rng));
        }
        log::debug!(
            "initialized population of {} ({seeded} seeded)",
            population.len()
        );

        Ok(Self {
            schema,
            config,
            population,
            rng,
            generation: 0,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Current population, in its current order.
    pub fn population(&self) -> &[Genotype] {
        &self.population
    }

    /// Mutable access for assigning fitness outside of
    /// [`ascertain_fitness`](Self::ascertain_fitness).
    pub fn population_mut(&mut self) -> &mut [Genotype] {
        &mut self.population
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The fittest scored genotype, if any genotype has been scored.
    pub fn best(&self) -> Option<&Genotype> {
        self.population
            .iter()
            .filter(|g| g.fitness().is_some())
            .max_by(|a, b| fitness_order(a, b))
    }

    /// Scores the whole population with `calculator`.
    ///
    /// Scores are assigned in submission order. Nothing is assigned unless
    /// the whole batch succeeds.
    ///
    /// # Errors
    ///
    /// [`EvolveError::Fitness`] if the calculator fails or returns a
    /// non-finite score, [`EvolveError::FitnessCount`] if it returns the
    /// wrong number of scores.
    pub fn ascertain_fitness<C>(&mut self, calculator: &mut C) -> Result<()>
    where
        C: FitnessCalculator + ?Sized,
    {
        let scores = calculator.ascertain_fitness(&self.population)?;
        if scores.len() != self.population.len() {
            return Err(EvolveError::FitnessCount {
                expected: self.population.len(),
                actual: scores.len(),
            });
        }
        if let Some((index, &score)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            log::warn!("fitness collaborator returned {score} for genotype #{index}");
            return Err(FitnessError::NonFinite { index, score }.into());
        }
        for (genotype, score) in self.population.iter_mut().zip(scores) {
            genotype.set_fitness(score);
        }
        Ok(())
    }

    /// Sorts the population by fitness, descending, and keeps the first
    /// `population_size / 2`.
    ///
    /// The sort is stable; unscored genotypes sort last.
    pub fn cull(&mut self) {
        self.population.sort_by(|a, b| fitness_order(b, a));
        let keep = self.config.population_size / 2;
        let removed = self.population.len().saturating_sub(keep);
        self.population.truncate(keep);
        log::debug!("culled {removed} genotypes, {keep} survive");
    }

    /// Draws `k` value-distinct genotypes; returns their indices.
    pub fn sample_distinct(&mut self, k: usize) -> Result<Vec<usize>> {
        selection::sample_distinct(&self.population, k, &mut self.rng, self.config.retry_limit)
    }

    /// Runs a size-`k` tournament; indices refer to [`population`](Self::population).
    ///
    /// `k == 0` yields no winner and the whole population as candidates.
    pub fn best_of(&mut self, k: usize) -> Result<Tournament> {
        selection::best_of(&self.population, k, &mut self.rng, self.config.retry_limit)
    }

    /// Selects two value-distinct parents by tournament; returns indices.
    pub fn tournament_select_pair(&mut self, k: usize) -> Result<(usize, usize)> {
        selection::select_pair(&self.population, k, &mut self.rng, self.config.retry_limit)
    }

    /// Crosses two tournament-selected parents into a new, unscored child.
    pub fn create_child_with_crossover(&mut self) -> Result<Genotype> {
        let (a, b) = self.tournament_select_pair(self.config.tournament_size)?;
        let profile = self.population[a].uniform_crossover(&self.population[b], &mut self.rng)?;
        log::trace!("crossover child of #{a} and #{b}");
        Genotype::from_profile(Arc::clone(&self.schema), profile)
    }

    /// Copies a tournament-selected parent and mutates the copy.
    pub fn create_child_with_mutation(&mut self) -> Result<Genotype> {
        let parent = selection::winner(
            &self.population,
            self.config.tournament_size,
            &mut self.rng,
            self.config.retry_limit,
        )?;
        let mut child = self.population[parent].clone();
        child.mutate_bounded(&mut self.rng, self.config.retry_limit)?;
        Ok(child)
    }

    /// One regeneration trial.
    ///
    /// With probability `crossover_rate` yields a crossover child and,
    /// independently, with probability `mutation_rate` a mutant child:
    /// zero, one or two children in total.
    pub fn spawn_offspring(&mut self) -> Result<Vec<Genotype>> {
        let mut children = Vec::with_capacity(2);
        if self.rng.random_range(0.0..1.0) < self.config.crossover_rate {
            children.push(self.create_child_with_crossover()?);
        }
        if self.rng.random_range(0.0..1.0) < self.config.mutation_rate {
            children.push(self.create_child_with_mutation()?);
        }
        Ok(children)
    }

    /// Refills the population to exactly `population_size`.
    ///
    /// Parents are drawn from the current population only; children join
    /// after the refill is complete. A trial can yield two children when
    /// one slot is left, so surplus children are dropped. Returns the
    /// number of children added.
    ///
    /// Trials repeat until every slot is filled. A valid configuration has
    /// a non-zero operator rate, so this terminates with probability 1;
    /// with very low rates most trials are empty.
    ///
    /// # Errors
    ///
    /// Propagates selection and operator errors.
    pub fn regenerate(&mut self) -> Result<usize> {
        let target = self
            .config
            .population_size
            .saturating_sub(self.population.len());
        let mut children = Vec::with_capacity(target + 1);
        let mut trials = 0usize;
        while children.len() < target {
            children.extend(self.spawn_offspring()?);
            trials += 1;
        }
        if children.len() > target {
            log::debug!("dropping {} surplus child", children.len() - target);
            children.truncate(target);
        }
        log::debug!("regenerated {target} children in {trials} trials");
        self.population.extend(children);
        Ok(target)
    }

    /// Runs one generation: ascertain fitness, cull, regenerate.
    pub fn step<C>(&mut self, calculator: &mut C) -> Result<GenerationStats>
    where
        C: FitnessCalculator + ?Sized,
    {
        self.ascertain_fitness(calculator)?;
        let (best_fitness, mean_fitness) = self.fitness_summary();
        self.cull();
        let children = self.regenerate()?;
        self.generation += 1;

        log::info!(
            "generation {}: best={best_fitness:.4} mean={mean_fitness:.4} children={children}",
            self.generation
        );
        Ok(GenerationStats {
            generation: self.generation,
            best_fitness,
            mean_fitness,
            children,
        })
    }

    /// Runs `max_generations` generations, then scores the final
    /// population and returns its fittest genotype.
    ///
    /// The population is left sorted by fitness, descending.
    pub fn run<C>(&mut self, calculator: &mut C) -> Result<GaResult>
    where
        C: FitnessCalculator + ?Sized,
    {
        let mut fitness_history = Vec::with_capacity(self.config.max_generations + 1);
        for _ in 0..self.config.max_generations {
            let stats = self.step(calculator)?;
            fitness_history.push(stats.best_fitness);
        }

        self.ascertain_fitness(calculator)?;
        self.population.sort_by(|a, b| fitness_order(b, a));
        let best = self.population[0].clone();
        let best_fitness = best.fitness().unwrap_or(f64::NEG_INFINITY);
        fitness_history.push(best_fitness);

        Ok(GaResult {
            best,
            best_fitness,
            generations: self.config.max_generations,
            fitness_history,
        })
    }

    fn fitness_summary(&self) -> (f64, f64) {
        let scores: Vec<f64> = self.population.iter().filter_map(Genotype::fitness).collect();
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        (best, mean)
    }
}

fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

// ============================================================================
// Tests
// ============================================================================
