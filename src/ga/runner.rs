//! GA evolutionary loop execution.
//!
//! [`GaEngine`] orchestrates the evolutionary process:
//! seeding → evaluation → selection → crossover + repair → mutation →
//! elitism → repeat.

use super::config::GaConfig;
use super::operators::{column_crossover, repair};
use crate::criteria::Criterion;
use crate::design::Design;
use crate::error::{Error, Result};
use crate::eval::evaluate_batch;
use crate::switch::SwitchEnumerator;
use rand::Rng;
use tracing::{debug, info, trace};

/// Random switch walks applied to each seeded population member.
const SEED_WALK: usize = 3;

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The best design observed in any generation.
    pub best: Design,

    /// Criterion value of `best`.
    pub best_value: f64,

    /// Criterion value of the initial design.
    pub initial_value: f64,

    /// Generations executed.
    pub generations: usize,

    /// Whether the run stopped on the stagnation limit.
    pub stagnated: bool,

    /// Best value of each generation, starting with the seeded population.
    pub history: Vec<f64>,

    /// Crossover children that needed repair and passed.
    pub repaired: usize,

    /// Crossover children that could not be repaired.
    pub rejected: usize,
}

#[derive(Debug, Clone)]
struct Member {
    design: Design,
    value: f64,
    cost: f64,
}

/// Genetic algorithm over FIP-preserving designs.
///
/// # Usage
///
/// ```
/// use u_sampling::criteria::HtVariance;
/// use u_sampling::design::Design;
/// use u_sampling::ga::{GaConfig, GaEngine};
/// use u_sampling::random::create_rng;
///
/// let fip = [0.5, 0.5, 0.5, 0.5];
/// let criterion = HtVariance::new(&[1.0, 2.0, 3.0, 4.0], &fip).unwrap();
/// let config = GaConfig::fast().with_switch_coefficient(0.25);
///
/// let engine = GaEngine::new(Design::from_fip(&fip).unwrap(), criterion, config).unwrap();
/// let result = engine.run(&mut create_rng(42));
/// assert!(result.best_value <= result.initial_value);
/// ```
#[derive(Debug, Clone)]
pub struct GaEngine<C: Criterion> {
    initial: Design,
    criterion: C,
    config: GaConfig,
    enumerator: SwitchEnumerator,
    initial_value: f64,
}

impl<C: Criterion> GaEngine<C> {
    /// Binds the seed design, the criterion and the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if [`GaConfig::validate`] fails.
    pub fn new(initial: Design, criterion: C, config: GaConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        let enumerator = SwitchEnumerator::new(config.switch_coefficient, config.num_changes)?;
        let initial_value = criterion.evaluate(&initial);
        Ok(Self {
            initial,
            criterion,
            config,
            enumerator,
            initial_value,
        })
    }

    /// The design the population is seeded from.
    pub fn initial(&self) -> &Design {
        &self.initial
    }

    /// Criterion value of the initial design.
    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    /// The bound configuration.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the evolutionary loop with a caller-owned random source.
    pub fn run<R: Rng>(&self, rng: &mut R) -> GaResult {
        let config = &self.config;

        let mut population = self.seed_population(rng);
        sort_by_cost(&mut population);

        // The initial design is a member, so this is never worse than it.
        let mut best = population[0].clone();
        let mut history = Vec::with_capacity(config.max_generations + 1);
        history.push(population[0].value);

        let mut repaired = 0;
        let mut rejected = 0;
        let mut stagnation_counter = 0usize;
        let mut generations = 0;
        let mut stagnated = false;

        for generation in 0..config.max_generations {
            let costs: Vec<f64> = population.iter().map(|m| m.cost).collect();

            let mut offspring = Vec::with_capacity(config.population_size);
            while offspring.len() < config.population_size {
                let p1 = &population[config.selection.select(&costs, rng)].design;
                let p2 = &population[config.selection.select(&costs, rng)].design;

                let mut child = if rng.random_bool(config.crossover_rate) {
                    match column_crossover(p1, p2, rng).and_then(|cols| repair(p1, cols)) {
                        Ok(r) => {
                            if r.modified {
                                repaired += 1;
                            }
                            r.design
                        }
                        Err(e) => {
                            trace!(error = %e, "crossover child rejected");
                            rejected += 1;
                            p1.clone()
                        }
                    }
                } else {
                    p1.clone()
                };

                if rng.random_bool(config.mutation_rate) {
                    if let Some(mutant) = self.enumerator.neighbor(&child, rng) {
                        child = mutant;
                    }
                }
                offspring.push(child);
            }

            let mut children: Vec<Member> =
                evaluate_batch(&self.criterion, offspring, config.parallel)
                    .into_iter()
                    .map(|(design, value)| self.member(design, value))
                    .collect();

            // Elites displace the weakest children.
            sort_by_cost(&mut children);
            children.truncate(config.population_size - config.elite_count);
            children.extend(population.drain(..config.elite_count));
            sort_by_cost(&mut children);
            population = children;

            let gen_best = &population[0];
            if gen_best.cost < best.cost {
                best = gen_best.clone();
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }
            history.push(gen_best.value);
            generations = generation + 1;

            debug!(
                generation = generations,
                generation_best = gen_best.value,
                best = best.value,
                repaired,
                rejected,
                "generation finished"
            );

            if config.stagnation_limit > 0 && stagnation_counter >= config.stagnation_limit {
                stagnated = true;
                break;
            }
        }

        info!(
            criterion = self.criterion.name(),
            generations,
            stagnated,
            initial = self.initial_value,
            best = best.value,
            "genetic algorithm finished"
        );

        GaResult {
            best: best.design,
            best_value: best.value,
            initial_value: self.initial_value,
            generations,
            stagnated,
            history,
            repaired,
            rejected,
        }
    }

    /// The initial design plus short random switch walks from it.
    fn seed_population<R: Rng>(&self, rng: &mut R) -> Vec<Member> {
        let mut seeds = Vec::with_capacity(self.config.population_size);
        seeds.push(self.initial.clone());
        while seeds.len() < self.config.population_size {
            let mut design = self.initial.clone();
            for _ in 0..SEED_WALK {
                if let Some(next) = self.enumerator.neighbor(&design, rng) {
                    design = next;
                }
            }
            seeds.push(design);
        }
        evaluate_batch(&self.criterion, seeds, self.config.parallel)
            .into_iter()
            .map(|(design, value)| self.member(design, value))
            .collect()
    }

    fn member(&self, design: Design, value: f64) -> Member {
        Member {
            design,
            value,
            cost: self.criterion.direction().cost(value),
        }
    }
}

/// Sorts members best first.
fn sort_by_cost(members: &mut [Member]) {
    members.sort_by(|a, b| a.cost.total_cmp(&b.cost));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{HtVariance, SpreadCriterion};
    use crate::ga::Selection;
    use crate::random::create_rng;

    const FIP: [f64; 4] = [0.5, 0.5, 0.5, 0.5];
    const Y: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

    fn variance_engine(config: GaConfig) -> GaEngine<HtVariance> {
        let criterion = HtVariance::new(&Y, &FIP).unwrap();
        GaEngine::new(Design::from_fip(&FIP).unwrap(), criterion, config).unwrap()
    }

    fn scenario_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(20)
            .with_elite_count(1)
            .with_mutation_rate(0.3)
            .with_max_generations(50)
            .with_stagnation_limit(0)
            .with_switch_coefficient(0.25)
    }

    #[test]
    fn test_scenario_history_is_monotone() {
        let engine = variance_engine(scenario_config());
        let result = engine.run(&mut create_rng(42));

        assert_eq!(result.generations, 50);
        assert_eq!(result.history.len(), 51);
        for w in result.history.windows(2) {
            assert!(w[1] <= w[0], "best-of-generation worsened: {} -> {}", w[0], w[1]);
        }
        assert!(result.best_value <= result.initial_value);
        assert!((result.initial_value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_preserves_fip() {
        let engine = variance_engine(scenario_config().with_num_changes(3));
        let result = engine.run(&mut create_rng(3));
        for (l, p) in result.best.unit_lengths().iter().zip(&FIP) {
            assert!((l - p).abs() < 1e-9);
        }
        let columns: Vec<Vec<_>> = result.best.columns().map(|c| c.to_vec()).collect();
        assert!(Design::from_columns(&FIP, columns).is_ok());
    }

    #[test]
    fn test_best_value_matches_best_design() {
        let criterion = HtVariance::new(&Y, &FIP).unwrap();
        let engine = variance_engine(scenario_config());
        let result = engine.run(&mut create_rng(17));
        assert!((criterion.evaluate(&result.best) - result.best_value).abs() < 1e-12);
    }

    #[test]
    fn test_maximize_history_is_monotone() {
        let coords = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 0.0],
        ];
        let criterion = SpreadCriterion::new(&coords, &FIP).unwrap();
        let config = scenario_config().with_selection(Selection::Rank);
        let engine = GaEngine::new(Design::from_fip(&FIP).unwrap(), criterion, config).unwrap();
        let result = engine.run(&mut create_rng(8));

        for w in result.history.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(result.best_value > result.initial_value);
    }

    #[test]
    fn test_stagnation_stops_early() {
        // Two certain units: every design is the initial one.
        let fip = [1.0, 1.0];
        let criterion = HtVariance::new(&[1.0, 5.0], &fip).unwrap();
        let config = GaConfig::default()
            .with_population_size(6)
            .with_max_generations(100)
            .with_stagnation_limit(5);
        let engine = GaEngine::new(Design::from_fip(&fip).unwrap(), criterion, config).unwrap();
        let result = engine.run(&mut create_rng(1));

        assert!(result.stagnated);
        assert_eq!(result.generations, 5);
        assert_eq!(result.best, *engine.initial());
    }

    #[test]
    fn test_crossover_on_spanning_units_counts_repairs() {
        let fip = [0.75, 0.75, 0.25, 0.6, 0.4];
        let y = [3.0, 1.0, 4.0, 1.5, 5.0];
        let criterion = HtVariance::new(&y, &fip).unwrap();
        let config = GaConfig::default()
            .with_population_size(30)
            .with_crossover_rate(1.0)
            .with_max_generations(20)
            .with_stagnation_limit(0)
            .with_num_changes(2);
        let engine = GaEngine::new(Design::from_fip(&fip).unwrap(), criterion, config).unwrap();
        let result = engine.run(&mut create_rng(21));

        assert!(result.repaired + result.rejected > 0);
        for (l, p) in result.best.unit_lengths().iter().zip(&fip) {
            assert!((l - p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reproducible_with_same_seed() {
        let engine = variance_engine(scenario_config().with_max_generations(15));
        let a = engine.run(&mut create_rng(77));
        let b = engine.run(&mut create_rng(77));
        assert_eq!(a.history, b.history);
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let criterion = HtVariance::new(&Y, &FIP).unwrap();
        let config = GaConfig::default().with_population_size(1);
        assert!(matches!(
            GaEngine::new(Design::from_fip(&FIP).unwrap(), criterion, config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
