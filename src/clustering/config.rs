//! Balanced clustering configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for [`Agg`](super::Agg).
///
/// # Builder Pattern
///
/// ```
/// use u_sampling::clustering::AggConfig;
///
/// let config = AggConfig::new(3)
///     .with_tolerance(6)
///     .with_max_iterations(50)
///     .with_restarts(5);
/// assert!(config.validate().is_ok());
/// assert!((config.threshold() - 1e-6).abs() < 1e-18);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AggConfig {
    /// Number of clusters.
    pub k: usize,

    /// Decimal tolerance exponent: totals below `10^-tolerance` count as zero.
    pub tolerance: i32,

    /// Transfer iterations before giving up on balance.
    pub max_iterations: usize,

    /// Independent k-means++ seedings; the lowest-inertia fit wins.
    pub restarts: usize,

    /// Lloyd iterations per k-means restart.
    pub kmeans_iterations: usize,

    /// Explicit starting centroids (`k` rows); disables k-means++ seeding.
    pub initial_centroids: Option<Vec<Vec<f64>>>,
}

impl Default for AggConfig {
    fn default() -> Self {
        Self {
            k: 2,
            tolerance: 9,
            max_iterations: 100,
            restarts: 10,
            kmeans_iterations: 300,
            initial_centroids: None,
        }
    }
}

impl AggConfig {
    /// Default configuration with `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Sets the tolerance exponent.
    pub fn with_tolerance(mut self, tolerance: i32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the transfer iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the number of k-means restarts.
    pub fn with_restarts(mut self, n: usize) -> Self {
        self.restarts = n;
        self
    }

    /// Sets the Lloyd iteration budget per restart.
    pub fn with_kmeans_iterations(mut self, n: usize) -> Self {
        self.kmeans_iterations = n;
        self
    }

    /// Starts k-means from the given centroids.
    pub fn with_initial_centroids(mut self, centroids: Vec<Vec<f64>>) -> Self {
        self.initial_centroids = Some(centroids);
        self
    }

    /// `10^-tolerance`.
    pub fn threshold(&self) -> f64 {
        10f64.powi(-self.tolerance)
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.k == 0 {
            return Err("k must be at least 1".into());
        }
        if self.restarts == 0 {
            return Err("restarts must be at least 1".into());
        }
        if self.kmeans_iterations == 0 {
            return Err("kmeans_iterations must be at least 1".into());
        }
        if let Some(c) = &self.initial_centroids {
            if c.len() != self.k {
                return Err(format!("expected {} initial centroids, got {}", self.k, c.len()));
            }
        }
        Ok(())
    }
}
