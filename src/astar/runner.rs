//! Best-first search execution.
//!
//! # Algorithm
//!
//! 1. Queue the initial design with `g = 0`, `h = cost(initial)`
//! 2. At each iteration:
//!    a. Pop the node with the lowest `f = g + h` (oldest first on ties)
//!    b. Discard it if its fingerprint was expanded with `g' <= g`
//!    c. Mark it expanded, update the global best
//!    d. Generate `num_new_nodes` neighbours with `g + 1` and their own `h`
//!    e. Trim the frontier back to `max_open_set_size`
//! 3. Stop after `iterations` pops or when the frontier empties
//!
//! The heuristic is the criterion value itself, not an admissible bound on
//! the remaining cost, so this is greedy best-first search with a depth
//! penalty rather than optimality-preserving A*.
//!
//! # Reference
//!
//! Hart, Nilsson & Raphael (1968), "A Formal Basis for the Heuristic
//! Determination of Minimum Cost Paths"; Pearl (1984), *Heuristics*, §2.

use super::config::AStarConfig;
use super::types::{OpenSet, SearchNode};
use crate::criteria::Criterion;
use crate::design::Design;
use crate::error::{Error, Result};
use crate::eval::evaluate_batch;
use crate::switch::SwitchEnumerator;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info};

/// Result of a best-first search run.
#[derive(Debug, Clone)]
pub struct AStarResult {
    /// Best design expanded during the run (the initial one if none beat it).
    pub best: Design,

    /// Criterion value of `best`.
    pub best_value: f64,

    /// Criterion value of the initial design, captured at construction.
    pub initial_value: f64,

    /// The last expanded design.
    pub current: Design,

    /// Depth of `current` in the search tree.
    pub current_depth: usize,

    /// Loop iterations executed (frontier pops).
    pub iterations: usize,

    /// Nodes actually expanded.
    pub expansions: usize,

    /// Pops discarded as already visited.
    pub discarded: usize,

    /// Nodes evicted from the frontier by capacity trims.
    pub evicted: usize,

    /// Largest frontier size observed after a trim.
    pub peak_open_set_size: usize,

    /// Criterion values along the parent chain from the root to `best`.
    pub best_path: Vec<f64>,

    /// Best value after each iteration.
    pub value_history: Vec<f64>,
}

/// One expanded node, kept for path reconstruction.
#[derive(Debug, Clone, Copy)]
struct Expanded {
    parent: Option<usize>,
    value: f64,
}

/// Best-first ("A*") search over FIP-preserving designs.
///
/// # Usage
///
/// ```
/// use u_sampling::astar::{AStarConfig, AStarEngine};
/// use u_sampling::criteria::HtVariance;
/// use u_sampling::design::Design;
/// use u_sampling::random::create_rng;
///
/// let fip = [0.5, 0.5, 0.5, 0.5];
/// let design = Design::from_fip(&fip).unwrap();
/// let criterion = HtVariance::new(&[1.0, 2.0, 3.0, 4.0], &fip).unwrap();
///
/// let engine = AStarEngine::new(design, criterion, 0.25).unwrap();
/// let config = AStarConfig::default().with_iterations(50).with_num_new_nodes(5);
/// let result = engine.run(&config, &mut create_rng(42)).unwrap();
/// assert!(result.best_value <= result.initial_value);
/// ```
#[derive(Debug, Clone)]
pub struct AStarEngine<C: Criterion> {
    initial: Design,
    criterion: C,
    switch_coefficient: f64,
    initial_value: f64,
}

impl<C: Criterion> AStarEngine<C> {
    /// Binds the start design, the criterion and the switch magnitude.
    ///
    /// Evaluates the initial design once; that value is reported by every
    /// subsequent run.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` unless `0 < switch_coefficient <= 1`.
    pub fn new(initial: Design, criterion: C, switch_coefficient: f64) -> Result<Self> {
        SwitchEnumerator::new(switch_coefficient, 1)?;
        let initial_value = criterion.evaluate(&initial);
        Ok(Self {
            initial,
            criterion,
            switch_coefficient,
            initial_value,
        })
    }

    /// The design every run starts from.
    pub fn initial(&self) -> &Design {
        &self.initial
    }

    /// Criterion value of the initial design.
    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    /// The bound criterion.
    pub fn criterion(&self) -> &C {
        &self.criterion
    }

    /// Runs the search with a caller-owned random source.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if [`AStarConfig::validate`] fails.
    pub fn run<R: Rng>(&self, config: &AStarConfig, rng: &mut R) -> Result<AStarResult> {
        config.validate().map_err(Error::InvalidConfig)?;
        let enumerator = SwitchEnumerator::new(self.switch_coefficient, config.num_changes)?;
        let direction = self.criterion.direction();

        let mut open = OpenSet::new(config.max_open_set_size);
        let mut visited: HashMap<u64, f64> = HashMap::new();
        let mut trace: Vec<Expanded> = Vec::new();
        let mut seq = 0u64;

        let root_h = direction.cost(self.initial_value);
        open.push(SearchNode {
            design: self.initial.clone(),
            value: self.initial_value,
            g: 0.0,
            h: root_h,
            f: root_h,
            depth: 0,
            parent: None,
            fingerprint: self.initial.fingerprint(),
            seq,
        });

        let mut best = self.initial.clone();
        let mut best_value = self.initial_value;
        let mut best_id: Option<usize> = None;
        let mut current = self.initial.clone();
        let mut current_depth = 0;

        let mut iterations = 0;
        let mut discarded = 0;
        let mut evicted = 0;
        let mut peak_open_set_size = open.len();
        let mut value_history = Vec::with_capacity(config.iterations);

        while iterations < config.iterations {
            let Some(node) = open.pop() else {
                break;
            };
            iterations += 1;

            if visited
                .get(&node.fingerprint)
                .is_some_and(|&seen_g| seen_g <= node.g)
            {
                discarded += 1;
                value_history.push(best_value);
                continue;
            }
            visited.insert(node.fingerprint, node.g);

            let id = trace.len();
            trace.push(Expanded {
                parent: node.parent,
                value: node.value,
            });
            if best_id.is_none() || direction.is_better(node.value, best_value) {
                best = node.design.clone();
                best_value = node.value;
                best_id = Some(id);
            }

            let children = enumerator.neighbors(&node.design, config.num_new_nodes, rng);
            for (design, value) in evaluate_batch(&self.criterion, children, config.parallel) {
                seq += 1;
                let g = node.g + 1.0;
                let h = direction.cost(value);
                open.push(SearchNode {
                    fingerprint: design.fingerprint(),
                    design,
                    value,
                    g,
                    h,
                    f: g + h,
                    depth: node.depth + 1,
                    parent: Some(id),
                    seq,
                });
            }
            evicted += open.trim();
            peak_open_set_size = peak_open_set_size.max(open.len());

            debug!(
                iteration = iterations,
                f = node.f,
                value = node.value,
                best = best_value,
                open = open.len(),
                "expanded node"
            );

            current = node.design;
            current_depth = node.depth;
            value_history.push(best_value);
        }

        let best_path = match best_id {
            Some(id) => path_to(&trace, id),
            None => vec![self.initial_value],
        };

        info!(
            criterion = self.criterion.name(),
            iterations,
            expansions = trace.len(),
            initial = self.initial_value,
            best = best_value,
            "best-first search finished"
        );

        Ok(AStarResult {
            best,
            best_value,
            initial_value: self.initial_value,
            current,
            current_depth,
            iterations,
            expansions: trace.len(),
            discarded,
            evicted,
            peak_open_set_size,
            best_path,
            value_history,
        })
    }
}

/// Criterion values from the root to `id`.
fn path_to(trace: &[Expanded], id: usize) -> Vec<f64> {
    let mut path = Vec::new();
    let mut cursor = Some(id);
    while let Some(i) = cursor {
        path.push(trace[i].value);
        cursor = trace[i].parent;
    }
    path.reverse();
    path
}
