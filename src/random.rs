//! Random sources and inclusion-probability helpers.
//!
//! Nothing in this crate draws from a process-wide generator. Every
//! operation that needs randomness takes a caller-owned `R: Rng`, and
//! [`create_rng`] gives the seeded generator used in tests and benches.
//!
//! # References
//!
//! - Särndal, Swensson & Wretman (1992), *Model Assisted Survey Sampling*, §3.6
//! - Tillé (2006), *Sampling Algorithms*, §2.10 (πps with certainty units)

use crate::error::{Error, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Tolerance used when deciding whether a unit has hit the cap of 1.
const CAP_TOLERANCE: f64 = 1e-12;

/// Creates a deterministic generator from a 64-bit seed.
///
/// The same seed and the same call sequence reproduce a run exactly.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Computes inclusion probabilities proportional to size.
///
/// `π_i = n · x_i / Σx`, except that units whose share would exceed 1 are
/// fixed at 1 and the remaining mass is redistributed over the others,
/// repeating until no entry exceeds 1. The result sums to `n`.
///
/// # Errors
///
/// `InvalidInclusionProbabilities` when `sizes` is empty, contains a
/// non-positive or non-finite value, or when `n` is not in `(0, N]`.
///
/// # Examples
///
/// ```
/// use u_sampling::random::inclusion_probabilities;
///
/// let pi = inclusion_probabilities(&[1.0, 1.0, 2.0, 4.0], 2.0).unwrap();
/// assert!((pi[3] - 1.0).abs() < 1e-12);
/// assert!((pi.iter().sum::<f64>() - 2.0).abs() < 1e-12);
/// ```
pub fn inclusion_probabilities(sizes: &[f64], n: f64) -> Result<Vec<f64>> {
    if sizes.is_empty() {
        return Err(Error::InvalidInclusionProbabilities(
            "size vector is empty".into(),
        ));
    }
    if let Some((i, x)) = sizes
        .iter()
        .enumerate()
        .find(|(_, x)| !x.is_finite() || **x <= 0.0)
    {
        return Err(Error::InvalidInclusionProbabilities(format!(
            "size of unit {i} must be positive and finite, got {x}"
        )));
    }
    if !n.is_finite() || n <= 0.0 || n > sizes.len() as f64 {
        return Err(Error::InvalidInclusionProbabilities(format!(
            "sample size must lie in (0, {}], got {n}",
            sizes.len()
        )));
    }

    let mut pi = vec![0.0; sizes.len()];
    let mut capped = vec![false; sizes.len()];
    loop {
        let remaining = n - capped.iter().filter(|&&c| c).count() as f64;
        let free_total: f64 = sizes
            .iter()
            .zip(&capped)
            .filter(|(_, &c)| !c)
            .map(|(x, _)| x)
            .sum();

        let mut newly_capped = false;
        for i in 0..sizes.len() {
            if capped[i] {
                pi[i] = 1.0;
                continue;
            }
            pi[i] = remaining * sizes[i] / free_total;
            if pi[i] >= 1.0 - CAP_TOLERANCE {
                capped[i] = true;
                newly_capped = true;
            }
        }
        if !newly_capped {
            break;
        }
    }

    for p in &mut pi {
        *p = p.min(1.0);
    }
    Ok(pi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_create_rng_is_reproducible() {
        let mut a = create_rng(7);
        let mut b = create_rng(7);
        for _ in 0..16 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn test_proportional_without_capping() {
        let pi = inclusion_probabilities(&[1.0, 2.0, 3.0, 4.0], 2.0).unwrap();
        assert!((pi[0] - 0.2).abs() < 1e-12);
        assert!((pi[3] - 0.8).abs() < 1e-12);
        assert!((pi.iter().sum::<f64>() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_capping_redistributes_mass() {
        // 10 dominates: its raw share 3 * 10 / 13 > 1.
        let pi = inclusion_probabilities(&[1.0, 1.0, 1.0, 10.0], 3.0).unwrap();
        assert!((pi[3] - 1.0).abs() < 1e-12);
        for &p in &pi[..3] {
            assert!((p - 2.0 / 3.0).abs() < 1e-12);
        }
        assert!((pi.iter().sum::<f64>() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cascading_caps() {
        let pi = inclusion_probabilities(&[1.0, 1.0, 6.0, 8.0], 3.0).unwrap();
        assert!(pi.iter().all(|&p| p > 0.0 && p <= 1.0));
        assert!((pi.iter().sum::<f64>() - 3.0).abs() < 1e-9);
        assert!((pi[2] - 1.0).abs() < 1e-12);
        assert!((pi[3] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(inclusion_probabilities(&[], 1.0).is_err());
        assert!(inclusion_probabilities(&[1.0, -1.0], 1.0).is_err());
        assert!(inclusion_probabilities(&[1.0, f64::NAN], 1.0).is_err());
        assert!(inclusion_probabilities(&[1.0, 1.0], 3.0).is_err());
        assert!(inclusion_probabilities(&[1.0, 1.0], 0.0).is_err());
    }
}
