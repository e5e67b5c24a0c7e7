//! Best-first search configuration.
//!
//! [`AStarConfig`] holds the per-run budget and frontier parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for one run of the best-first engine.
///
/// # Defaults
///
/// ```
/// use u_sampling::astar::AStarConfig;
///
/// let config = AStarConfig::default();
/// assert_eq!(config.iterations, 1000);
/// assert_eq!(config.max_open_set_size, 1000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_sampling::astar::AStarConfig;
///
/// let config = AStarConfig::default()
///     .with_iterations(100)
///     .with_num_new_nodes(5)
///     .with_max_open_set_size(50)
///     .with_num_changes(1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AStarConfig {
    /// Loop iterations (frontier pops) before the search stops.
    ///
    /// A pop discarded as a duplicate still consumes an iteration.
    pub iterations: usize,

    /// Neighbours requested from the switch enumerator per expansion.
    pub num_new_nodes: usize,

    /// Frontier capacity; the worst-`f` nodes are evicted beyond it.
    ///
    /// A capacity of 1 turns the search into hill climbing.
    pub max_open_set_size: usize,

    /// Maximum switches composed into one neighbour.
    pub num_changes: usize,

    /// Evaluate neighbours in parallel (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            num_new_nodes: 10,
            max_open_set_size: 1000,
            num_changes: 1,
            parallel: false,
        }
    }
}

impl AStarConfig {
    /// Sets the iteration budget.
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Sets the number of neighbours generated per expansion.
    pub fn with_num_new_nodes(mut self, n: usize) -> Self {
        self.num_new_nodes = n;
        self
    }

    /// Sets the frontier capacity.
    pub fn with_max_open_set_size(mut self, n: usize) -> Self {
        self.max_open_set_size = n;
        self
    }

    /// Sets the maximum number of composed switches per neighbour.
    pub fn with_num_changes(mut self, n: usize) -> Self {
        self.num_changes = n;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Preset for greedy hill climbing: a frontier of one node.
    pub fn hill_climbing() -> Self {
        Self {
            max_open_set_size: 1,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    /// `iterations = 0` is valid and returns the initial design.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_new_nodes == 0 {
            return Err("num_new_nodes must be at least 1".into());
        }
        if self.max_open_set_size == 0 {
            return Err("max_open_set_size must be at least 1".into());
        }
        if self.num_changes == 0 {
            return Err("num_changes must be at least 1".into());
        }
        Ok(())
    }
}
