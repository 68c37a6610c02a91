//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

/// Configuration for the genetic algorithm.
///
/// Controls population size, operator rates, tournament pressure, the
/// bound on every retry loop, and the generation count used by
/// [`GeneticAlgorithm::run`](super::GeneticAlgorithm::run).
///
/// # Defaults
///
/// ```
/// use evolve_profile::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 20);
/// assert_eq!(config.tournament_size, 3);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use evolve_profile::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(40)
///     .with_tournament_size(4)
///     .with_mutation_rate(0.2)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GaConfig {
    /// Number of genotypes kept after each regeneration.
    ///
    /// Every physical evaluation costs a print, so populations are small.
    pub population_size: usize,

    /// Probability that a regeneration trial yields a crossover child.
    pub crossover_rate: f64,

    /// Probability that a regeneration trial yields a mutant child.
    ///
    /// Tested independently of `crossover_rate`: one trial may yield
    /// zero, one or two children.
    pub mutation_rate: f64,

    /// Number of distinct candidates drawn per tournament.
    ///
    /// Tournaments run on the survivors of culling, so this must stay
    /// below `population_size / 2`.
    pub tournament_size: usize,

    /// Generations performed by `run`.
    pub max_generations: usize,

    /// Upper bound on attempts for the selection and mutation retry loops:
    /// distinct sampling, pair selection and mutation resampling.
    pub retry_limit: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            crossover_rate: 0.5,
            mutation_rate: 0.1,
            tournament_size: 3,
            max_generations: 10,
            retry_limit: 1_000,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the number of generations performed by `run`.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the retry bound.
    pub fn with_retry_limit(mut self, n: usize) -> Self {
        self.retry_limit = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        let survivors = self.population_size / 2;
        if self.tournament_size == 0 || self.tournament_size >= survivors {
            return Err(ConfigError::TournamentSize {
                tournament: self.tournament_size,
                survivors,
            });
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::RateOutOfRange { name, rate });
            }
        }
        if self.crossover_rate == 0.0 && self.mutation_rate == 0.0 {
            return Err(ConfigError::NoOperators);
        }
        if self.max_generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if self.retry_limit == 0 {
            return Err(ConfigError::ZeroRetryLimit);
        }
        Ok(())
    }
}

/// GA configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("population_size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("tournament_size {tournament} must be in 1..{survivors} (survivors of culling)")]
    TournamentSize { tournament: usize, survivors: usize },
    #[error("{name} must be within [0, 1], got {rate}")]
    RateOutOfRange { name: &'static str, rate: f64 },
    #[error("crossover_rate and mutation_rate are both zero; no children can be produced")]
    NoOperators,
    #[error("max_generations must be at least 1")]
    ZeroGenerations,
    #[error("retry_limit must be at least 1")]
    ZeroRetryLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 20);
        assert!((config.crossover_rate - 0.5).abs() < 1e-10);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.retry_limit, 1_000);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(50)
            .with_crossover_rate(0.8)
            .with_mutation_rate(0.05)
            .with_tournament_size(5)
            .with_max_generations(7)
            .with_retry_limit(10)
            .with_seed(42);

        assert_eq!(config.population_size, 50);
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.tournament_size, 5);
        assert_eq!(config.max_generations, 7);
        assert_eq!(config.retry_limit, 10);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_clamp_rates() {
        let config = GaConfig::default()
            .with_crossover_rate(-0.5)
            .with_mutation_rate(2.0);
        assert!((config.crossover_rate - 0.0).abs() < 1e-10);
        assert!((config.mutation_rate - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = GaConfig::default().with_population_size(1);
        assert_eq!(config.validate(), Err(ConfigError::PopulationTooSmall(1)));
    }

    #[test]
    fn test_validate_tournament_bounds() {
        let config = GaConfig::default().with_tournament_size(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TournamentSize { .. })
        ));

        let config = GaConfig::default()
            .with_population_size(7)
            .with_tournament_size(3);
        assert_eq!(
            config.validate(),
            Err(ConfigError::TournamentSize {
                tournament: 3,
                survivors: 3
            })
        );

        let config = GaConfig::default()
            .with_population_size(8)
            .with_tournament_size(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rates() {
        let config = GaConfig::default()
            .with_crossover_rate(0.0)
            .with_mutation_rate(0.0);
        assert_eq!(config.validate(), Err(ConfigError::NoOperators));

        // direct field writes bypass clamping
        let config = GaConfig {
            mutation_rate: 1.5,
            ..GaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RateOutOfRange { name: "mutation_rate", .. })
        ));
    }

    #[test]
    fn test_validate_zero_bounds() {
        let config = GaConfig::default().with_max_generations(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroGenerations));

        let config = GaConfig::default().with_retry_limit(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroRetryLimit));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GaConfig =
            serde_json::from_str(r#"{"population_size": 30, "seed": 9}"#).unwrap();
        assert_eq!(config.population_size, 30);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.tournament_size, 3);
    }
}
