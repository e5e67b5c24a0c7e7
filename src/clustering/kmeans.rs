//! Hard k-means with k-means++ seeding and restarts.
//!
//! # References
//!
//! - Lloyd (1982), "Least Squares Quantization in PCM"
//! - Arthur & Vassilvitskii (2007), "k-means++: The Advantages of Careful Seeding"

use super::config::AggConfig;
use rand::Rng;
use tracing::trace;

/// A hard partition of the points.
#[derive(Debug, Clone)]
pub(crate) struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    pub inertia: f64,
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Best of `config.restarts` Lloyd runs, or one run from the given centroids.
///
/// `points` must be non-empty with `config.k <= points.len()`.
pub(crate) fn fit<R: Rng>(points: &[Vec<f64>], config: &AggConfig, rng: &mut R) -> KMeansFit {
    let tol = config.threshold();
    if let Some(init) = &config.initial_centroids {
        return lloyd(points, init.clone(), config.kmeans_iterations, tol);
    }

    let mut best: Option<KMeansFit> = None;
    for restart in 0..config.restarts {
        let seeds = plus_plus_seeds(points, config.k, rng);
        let fit = lloyd(points, seeds, config.kmeans_iterations, tol);
        trace!(restart, inertia = fit.inertia, "k-means restart");
        match &best {
            Some(b) if b.inertia <= fit.inertia => {}
            _ => best = Some(fit),
        }
    }
    best.unwrap_or_else(|| lloyd(points, plus_plus_seeds(points, config.k, rng), 1, tol))
}

/// k-means++: each new seed is drawn with probability proportional to its
/// squared distance from the nearest seed chosen so far.
fn plus_plus_seeds<R: Rng>(points: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut seeds = vec![points[rng.random_range(0..n)].clone()];
    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &seeds[0]))
        .collect();

    while seeds.len() < k {
        let total: f64 = nearest.iter().sum();
        let idx = if total > 0.0 && total.is_finite() {
            let threshold = rng.random_range(0.0..total);
            let mut cumulative = 0.0;
            nearest
                .iter()
                .position(|&d| {
                    cumulative += d;
                    cumulative > threshold
                })
                .unwrap_or(n - 1)
        } else {
            rng.random_range(0..n)
        };
        let seed = points[idx].clone();
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &seed));
        }
        seeds.push(seed);
    }
    seeds
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iterations: usize, tol: f64) -> KMeansFit {
    let k = centroids.len();
    let dim = points.first().map_or(0, Vec::len);
    let mut labels = vec![0; points.len()];

    for _ in 0..max_iterations {
        for (label, p) in labels.iter_mut().zip(points) {
            *label = nearest_centroid(p, &centroids);
        }

        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0usize; k];
        for (&label, p) in labels.iter().zip(points) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(p) {
                *s += x;
            }
        }

        let mut shift: f64 = 0.0;
        for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(&counts) {
            // Empty clusters keep their centroid.
            if count == 0 {
                continue;
            }
            let updated: Vec<f64> = sum.into_iter().map(|s| s / count as f64).collect();
            shift = shift.max(squared_distance(centroid, &updated));
            *centroid = updated;
        }
        if shift <= tol {
            break;
        }
    }

    for (label, p) in labels.iter_mut().zip(points) {
        *label = nearest_centroid(p, &centroids);
    }
    let inertia = labels
        .iter()
        .zip(points)
        .map(|(&l, p)| squared_distance(p, &centroids[l]))
        .sum();
    KMeansFit {
        centroids,
        labels,
        inertia,
    }
}

/// Index of the closest centroid; ties go to the lower index.
fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (j, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_d {
            best = j;
            best_d = d;
        }
    }
    best
}
