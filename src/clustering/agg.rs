//! Balanced soft clustering by fractional membership transfers.

use super::config::AggConfig;
use super::kmeans::{self, squared_distance};
use crate::error::{Error, Result};
use rand::Rng;
use tracing::{debug, info};

/// Numerical guard added to total differences before taking their norm.
const DIFF_GUARD: f64 = 1e-9;

/// Result of [`Agg::fit`].
#[derive(Debug, Clone)]
pub struct AggResult {
    /// Final centroids in the geometry space (`k` rows).
    pub centroids: Vec<Vec<f64>>,

    /// Hard labels from the initial k-means partition.
    pub labels: Vec<usize>,

    /// Row-stochastic membership matrix (`N × k`).
    pub membership: Vec<Vec<f64>>,

    /// Per-cluster feature totals `T_jf = Σ_i X_if · M_ij` (`k × m`).
    pub cluster_totals: Vec<Vec<f64>>,

    /// Weighted scalar totals `T_j = Σ_f w_f · T_jf`.
    pub totals: Vec<f64>,

    /// Transfer iterations executed.
    pub iterations: usize,

    /// Whether every `|T_j|` fell below the tolerance.
    pub converged: bool,
}

/// Balanced soft clustering.
///
/// Starts from a k-means partition of the geometry features `Y`, then
/// moves fractions of unit membership between clusters until every
/// cluster's weighted total of the balancing features `X` is (near) zero.
/// Each iteration makes the single transfer with the smallest geometric
/// cost per unit of balance gained.
///
/// # Examples
///
/// ```
/// use u_sampling::clustering::{Agg, AggConfig};
/// use u_sampling::random::create_rng;
///
/// let y = vec![vec![0.0], vec![0.1], vec![10.0], vec![10.1]];
/// let x = vec![vec![1.0], vec![-1.0], vec![1.0], vec![-1.0]];
/// let agg = Agg::new(AggConfig::new(2)).unwrap();
///
/// let result = agg.fit(&y, &x, &[1.0], &mut create_rng(7)).unwrap();
/// assert!(result.converged);
/// ```
#[derive(Debug, Clone)]
pub struct Agg {
    config: AggConfig,
}

impl Agg {
    /// Creates a clusterer.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if [`AggConfig::validate`] fails.
    pub fn new(config: AggConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        Ok(Self { config })
    }

    /// The bound configuration.
    pub fn config(&self) -> &AggConfig {
        &self.config
    }

    /// Clusters `N` units.
    ///
    /// - `y`: geometry features, `N` rows of equal width
    /// - `x`: balancing features, `N` rows of width `m`
    /// - `weights`: `m` feature weights
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` for inconsistent row counts or widths
    /// - `InvalidConfig` if there are fewer units than clusters
    pub fn fit<R: Rng>(
        &self,
        y: &[Vec<f64>],
        x: &[Vec<f64>],
        weights: &[f64],
        rng: &mut R,
    ) -> Result<AggResult> {
        let k = self.config.k;
        let n = y.len();
        check_dimensions(y, x, weights)?;
        if n < k {
            return Err(Error::InvalidConfig(format!(
                "cannot form {k} clusters from {n} units"
            )));
        }
        if let Some(init) = &self.config.initial_centroids {
            if let Some(row) = init.iter().find(|c| c.len() != y[0].len()) {
                return Err(Error::DimensionMismatch {
                    expected: y[0].len(),
                    found: row.len(),
                });
            }
        }

        let partition = kmeans::fit(y, &self.config, rng);
        let mut state = Balance {
            y,
            x,
            weights,
            threshold: self.config.threshold(),
            centroids: partition.centroids,
            membership: partition
                .labels
                .iter()
                .map(|&l| {
                    let mut row = vec![0.0; k];
                    row[l] = 1.0;
                    row
                })
                .collect(),
            cluster_totals: Vec::new(),
            totals: Vec::new(),
        };
        state.refresh_totals();

        let mut iterations = 0;
        while !state.balanced() && iterations < self.config.max_iterations {
            let Some((unit, from, to)) = state.cheapest_transfer() else {
                debug!(iteration = iterations, "no finite-cost transfer left");
                break;
            };
            if (state.totals[from] - state.totals[to]).abs() > state.threshold {
                state.transfer(unit, from, to);
                state.refresh_totals();
            }
            state.update_centroids();
            iterations += 1;

            debug!(
                iteration = iterations,
                unit,
                from,
                to,
                max_total = state.max_abs_total(),
                "membership transfer"
            );
        }

        let converged = state.balanced();
        info!(
            k,
            units = n,
            iterations,
            converged,
            max_total = state.max_abs_total(),
            "balanced clustering finished"
        );

        Ok(AggResult {
            centroids: state.centroids,
            labels: partition.labels,
            membership: state.membership,
            cluster_totals: state.cluster_totals,
            totals: state.totals,
            iterations,
            converged,
        })
    }
}

fn check_dimensions(y: &[Vec<f64>], x: &[Vec<f64>], weights: &[f64]) -> Result<()> {
    if y.is_empty() {
        return Err(Error::InvalidConfig("no units to cluster".into()));
    }
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch {
            expected: y.len(),
            found: x.len(),
        });
    }
    let d = y[0].len();
    if let Some(row) = y.iter().find(|r| r.len() != d) {
        return Err(Error::DimensionMismatch {
            expected: d,
            found: row.len(),
        });
    }
    if let Some(row) = x.iter().find(|r| r.len() != weights.len()) {
        return Err(Error::DimensionMismatch {
            expected: weights.len(),
            found: row.len(),
        });
    }
    Ok(())
}

/// Mutable state of the transfer loop.
struct Balance<'a> {
    y: &'a [Vec<f64>],
    x: &'a [Vec<f64>],
    weights: &'a [f64],
    threshold: f64,
    centroids: Vec<Vec<f64>>,
    membership: Vec<Vec<f64>>,
    cluster_totals: Vec<Vec<f64>>,
    totals: Vec<f64>,
}

impl Balance<'_> {
    fn k(&self) -> usize {
        self.centroids.len()
    }

    fn refresh_totals(&mut self) {
        let m = self.weights.len();
        let mut t = vec![vec![0.0; m]; self.k()];
        for (row, xi) in self.membership.iter().zip(self.x) {
            for (tj, &mij) in t.iter_mut().zip(row) {
                for (tjf, xif) in tj.iter_mut().zip(xi) {
                    *tjf += xif * mij;
                }
            }
        }
        self.totals = t
            .iter()
            .map(|tj| tj.iter().zip(self.weights).map(|(t, w)| t * w).sum())
            .collect();
        self.cluster_totals = t;
    }

    fn balanced(&self) -> bool {
        self.totals.iter().all(|t| t.abs() < self.threshold)
    }

    fn max_abs_total(&self) -> f64 {
        self.totals.iter().fold(0.0, |acc, t| acc.max(t.abs()))
    }

    /// `Σ_f w_f x_if (T_from,f − T_to,f) / (2 Σ_f w_f x_if²)`: the share of
    /// unit `i` whose move best equalizes the two clusters.
    fn minimum_percent(&self, i: usize, from: usize, to: usize) -> f64 {
        let xi = &self.x[i];
        let (tf, tt) = (&self.cluster_totals[from], &self.cluster_totals[to]);
        let mut num = 0.0;
        let mut den = 0.0;
        for f in 0..xi.len() {
            num += self.weights[f] * xi[f] * (tf[f] - tt[f]);
            den += self.weights[f] * xi[f] * xi[f];
        }
        num / (2.0 * den)
    }

    /// Share of unit `i` whose removal zeroes cluster `j`'s projection on it.
    fn zero_percent(&self, i: usize, j: usize) -> f64 {
        let xi = &self.x[i];
        let tj = &self.cluster_totals[j];
        let mut num = 0.0;
        let mut den = 0.0;
        for f in 0..xi.len() {
            num += self.weights[f] * xi[f] * tj[f];
            den += self.weights[f] * xi[f] * xi[f];
        }
        num / den
    }

    /// Geometric cost of moving unit `i` per squared balance difference,
    /// or infinity when the move would not help.
    fn transfer_cost(&self, i: usize, from: usize, to: usize) -> f64 {
        let share = self.minimum_percent(i, from, to);
        // NaN comes from an all-zero feature row.
        if share.is_nan() || share <= self.threshold {
            return f64::INFINITY;
        }
        let gain = squared_distance(&self.y[i], &self.centroids[to])
            - squared_distance(&self.y[i], &self.centroids[from]);
        let norm: f64 = self.cluster_totals[from]
            .iter()
            .zip(&self.cluster_totals[to])
            .zip(self.weights)
            .map(|((a, b), w)| {
                let d = a - b + DIFF_GUARD;
                w * d * d
            })
            .sum();
        gain / norm
    }

    fn cheapest_transfer(&self) -> Option<(usize, usize, usize)> {
        let mut best: Option<(f64, (usize, usize, usize))> = None;
        for (i, row) in self.membership.iter().enumerate() {
            for from in (0..self.k()).filter(|&j| row[j] > 0.0) {
                for to in 0..self.k() {
                    let cost = self.transfer_cost(i, from, to);
                    if !cost.is_finite() {
                        continue;
                    }
                    match best {
                        Some((c, _)) if c <= cost => {}
                        _ => best = Some((cost, (i, from, to))),
                    }
                }
            }
        }
        best.map(|(_, t)| t)
    }

    fn transfer(&mut self, i: usize, from: usize, to: usize) {
        let (tf, tt) = (self.totals[from], self.totals[to]);
        let eps = self.threshold;
        let same_sign = (tf >= -eps && tt >= -eps) || (tf <= eps && tt <= eps);
        let held = self.membership[i][from];
        let share = if same_sign {
            held.min(self.minimum_percent(i, from, to))
        } else {
            held.min(self.zero_percent(i, from).max(0.0))
                .min((-self.zero_percent(i, to)).max(0.0))
        };
        self.membership[i][from] -= share;
        self.membership[i][to] += share;
    }

    /// Membership-weighted means; clusters without mass keep their centroid.
    fn update_centroids(&mut self) {
        for (j, centroid) in self.centroids.iter_mut().enumerate() {
            let mass: f64 = self.membership.iter().map(|row| row[j]).sum();
            if mass <= 0.0 {
                continue;
            }
            for (d, c) in centroid.iter_mut().enumerate() {
                *c = self
                    .membership
                    .iter()
                    .zip(self.y)
                    .map(|(row, yi)| row[j] * yi[d])
                    .sum::<f64>()
                    / mass;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn assert_row_stochastic(membership: &[Vec<f64>]) {
        for row in membership {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9, "row {row:?}");
            assert!(row.iter().all(|&m| (-1e-12..=1.0 + 1e-12).contains(&m)));
        }
    }

    #[test]
    fn test_already_balanced_partition_is_kept() {
        let y = vec![vec![0.0], vec![0.1], vec![10.0], vec![10.1]];
        let x = vec![vec![1.0], vec![-1.0], vec![1.0], vec![-1.0]];
        let agg = Agg::new(AggConfig::new(2)).unwrap();
        let result = agg.fit(&y, &x, &[1.0], &mut create_rng(3)).unwrap();

        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.labels[0], result.labels[1]);
        assert_ne!(result.labels[0], result.labels[2]);
        assert_row_stochastic(&result.membership);
    }

    #[test]
    fn test_single_transfer_balances_pair() {
        let y = vec![vec![0.0], vec![10.0]];
        let x = vec![vec![1.0], vec![-1.0]];
        let agg = Agg::new(AggConfig::new(2)).unwrap();
        let result = agg.fit(&y, &x, &[1.0], &mut create_rng(5)).unwrap();

        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert!(result.totals.iter().all(|t| t.abs() < 1e-9));
        assert_row_stochastic(&result.membership);
    }

    #[test]
    fn test_totals_match_membership() {
        let y: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64, (i * i) as f64 * 0.1]).collect();
        let x: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![i as f64 - 3.5, if i % 2 == 0 { 1.0 } else { -1.0 }])
            .collect();
        let weights = [1.0, 0.5];
        let agg = Agg::new(AggConfig::new(3).with_max_iterations(40)).unwrap();
        let result = agg.fit(&y, &x, &weights, &mut create_rng(11)).unwrap();

        assert_row_stochastic(&result.membership);
        for j in 0..3 {
            let mut t = [0.0; 2];
            for (row, xi) in result.membership.iter().zip(&x) {
                t[0] += row[j] * xi[0];
                t[1] += row[j] * xi[1];
            }
            assert!((t[0] - result.cluster_totals[j][0]).abs() < 1e-9);
            assert!((t[1] - result.cluster_totals[j][1]).abs() < 1e-9);
            let scalar = t[0] * weights[0] + t[1] * weights[1];
            assert!((scalar - result.totals[j]).abs() < 1e-9);
        }
        assert!(result.iterations <= 40);
    }

    #[test]
    fn test_rejects_bad_input() {
        let agg = Agg::new(AggConfig::new(3)).unwrap();
        let mut rng = create_rng(1);
        let y = vec![vec![0.0], vec![1.0]];
        let x = vec![vec![1.0], vec![-1.0]];

        assert!(matches!(
            agg.fit(&y, &x, &[1.0], &mut rng),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            agg.fit(&y, &x[..1], &[1.0], &mut rng),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            agg.fit(&y, &x, &[1.0, 2.0], &mut rng),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(Agg::new(AggConfig::new(0)).is_err());
    }
}
