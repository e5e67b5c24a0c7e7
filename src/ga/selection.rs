//! Parent selection strategies.
//!
//! Selection works on oriented costs (see
//! [`Direction::cost`](crate::criteria::Direction::cost)), so the same code
//! favours low variance when minimizing and high spread when maximizing.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Selection strategy for choosing parents.
///
/// All strategies read **costs**: lower is better.
///
/// # Examples
///
/// ```
/// use u_sampling::ga::Selection;
/// use u_sampling::random::create_rng;
///
/// let costs = [4.0, 1.0, 3.0];
/// let idx = Selection::Tournament(3).select(&costs, &mut create_rng(1));
/// assert!(idx < costs.len());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Selection {
    /// Pick `k` members uniformly with replacement and keep the cheapest.
    ///
    /// Higher `k` means stronger selection pressure.
    Tournament(usize),

    /// Fitness-proportionate selection on inverted costs.
    ///
    /// Weight of member `i` is `max_cost - cost_i + ε`.
    Roulette,

    /// Linear ranking: the cheapest of `n` members gets weight `n`, the
    /// most expensive weight 1.
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Selects a parent index.
    ///
    /// # Panics
    /// Panics if `costs` is empty.
    pub fn select<R: Rng>(&self, costs: &[f64], rng: &mut R) -> usize {
        assert!(!costs.is_empty(), "cannot select from empty population");

        match self {
            Selection::Tournament(k) => tournament(costs, *k, rng),
            Selection::Roulette => roulette(costs, rng),
            Selection::Rank => rank(costs, rng),
        }
    }
}

fn tournament<R: Rng>(costs: &[f64], k: usize, rng: &mut R) -> usize {
    let n = costs.len();
    let mut best = rng.random_range(0..n);
    for _ in 1..k.max(1) {
        let idx = rng.random_range(0..n);
        if costs[idx] < costs[best] {
            best = idx;
        }
    }
    best
}

fn roulette<R: Rng>(costs: &[f64], rng: &mut R) -> usize {
    let n = costs.len();
    if n == 1 {
        return 0;
    }

    let max_cost = costs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let epsilon = 1e-10;
    let weights: Vec<f64> = costs
        .iter()
        .map(|&c| (max_cost - c + epsilon).max(epsilon))
        .collect();

    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }
    n - 1
}

fn rank<R: Rng>(costs: &[f64], rng: &mut R) -> usize {
    let n = costs.len();
    if n == 1 {
        return 0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]));

    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (position, &idx) in order.iter().enumerate() {
        cumulative += (n - position) as f64;
        if cumulative > threshold {
            return idx;
        }
    }
    order[n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn counts(selection: Selection, costs: &[f64], draws: usize) -> Vec<u32> {
        let mut rng = create_rng(42);
        let mut counts = vec![0u32; costs.len()];
        for _ in 0..draws {
            counts[selection.select(costs, &mut rng)] += 1;
        }
        counts
    }

    #[test]
    fn test_tournament_favors_cheapest() {
        let c = counts(Selection::Tournament(4), &[10.0, 5.0, 1.0, 8.0], 10_000);
        assert!(c[2] > 6000, "expected cheapest to dominate, got {c:?}");
    }

    #[test]
    fn test_tournament_size_1_is_uniform() {
        let c = counts(Selection::Tournament(1), &[10.0, 5.0, 1.0, 8.0], 10_000);
        for &n in &c {
            assert!(n > 1500, "expected uniform, got {c:?}");
        }
    }

    #[test]
    fn test_roulette_favors_cheapest() {
        let c = counts(Selection::Roulette, &[100.0, 50.0, 1.0, 80.0], 10_000);
        assert!(c[2] > c[0], "got {c:?}");
    }

    #[test]
    fn test_rank_favors_cheapest() {
        let c = counts(Selection::Rank, &[100.0, 50.0, 1.0, 80.0], 10_000);
        assert!(c[2] > c[1] && c[1] > c[0], "got {c:?}");
    }

    #[test]
    fn test_negative_costs_from_maximization() {
        // Spread values 2, 9, 4 oriented for maximization.
        let c = counts(Selection::Rank, &[-2.0, -9.0, -4.0], 10_000);
        assert!(c[1] > c[2] && c[2] > c[0], "got {c:?}");
    }

    #[test]
    fn test_single_member() {
        let mut rng = create_rng(42);
        assert_eq!(Selection::Tournament(3).select(&[5.0], &mut rng), 0);
        assert_eq!(Selection::Roulette.select(&[5.0], &mut rng), 0);
        assert_eq!(Selection::Rank.select(&[5.0], &mut rng), 0);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        Selection::Roulette.select(&[], &mut create_rng(42));
    }
}
