//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::selection::Selection;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the genetic algorithm over designs.
///
/// # Defaults
///
/// ```
/// use u_sampling::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.elite_count, 2);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_sampling::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(80)
///     .with_selection(Selection::Rank)
///     .with_elite_count(4)
///     .with_mutation_rate(0.3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Number of designs in the population.
    pub population_size: usize,

    /// Best designs carried unchanged into the next generation.
    ///
    /// With at least one elite the best-of-generation value never worsens.
    pub elite_count: usize,

    /// Probability of mutating a child with a switch walk (0.0–1.0).
    pub mutation_rate: f64,

    /// Probability of recombining two parents (0.0–1.0).
    ///
    /// When crossover is skipped, a clone of the first parent is used.
    pub crossover_rate: f64,

    /// Selection strategy for choosing parents.
    pub selection: Selection,

    /// Maximum number of generations.
    pub max_generations: usize,

    /// Generations without a new best before stopping; 0 disables it.
    pub stagnation_limit: usize,

    /// Maximum piece length moved by one mutation switch.
    pub switch_coefficient: f64,

    /// Maximum switches composed into one mutation.
    pub num_changes: usize,

    /// Evaluate children in parallel (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            elite_count: 2,
            mutation_rate: 0.2,
            crossover_rate: 0.8,
            selection: Selection::default(),
            max_generations: 100,
            stagnation_limit: 30,
            switch_coefficient: 0.1,
            num_changes: 1,
            parallel: false,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of elites.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the mutation switch magnitude.
    pub fn with_switch_coefficient(mut self, coef: f64) -> Self {
        self.switch_coefficient = coef;
        self
    }

    /// Sets the maximum switches per mutation.
    pub fn with_num_changes(mut self, n: usize) -> Self {
        self.num_changes = n;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Convenience builder for `Selection::Tournament(k)`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Preset for quick exploration.
    ///
    /// - Population: 20, Generations: 50, Stagnation limit: 15
    pub fn fast() -> Self {
        Self {
            population_size: 20,
            max_generations: 50,
            stagnation_limit: 15,
            ..Self::default()
        }
    }

    /// Preset for thorough search.
    ///
    /// - Population: 100, Generations: 500, Stagnation limit: 80
    /// - Elites: 4, Switches per mutation: up to 3
    pub fn quality() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            stagnation_limit: 80,
            elite_count: 4,
            num_changes: 3,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.elite_count >= self.population_size {
            return Err("elite_count must be smaller than population_size".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must lie in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err("crossover_rate must lie in [0, 1]".into());
        }
        if !(self.switch_coefficient > 0.0 && self.switch_coefficient <= 1.0) {
            return Err("switch_coefficient must lie in (0, 1]".into());
        }
        if self.num_changes == 0 {
            return Err("num_changes must be at least 1".into());
        }
        if self.selection == Selection::Tournament(0) {
            return Err("tournament size must be at least 1".into());
        }
        Ok(())
    }
}
