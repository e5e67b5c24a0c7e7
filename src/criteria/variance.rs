//! Horvitz–Thompson variance in Sen–Yates–Grundy form.

use super::types::{Criterion, Direction};
use crate::design::Design;
use crate::error::{Error, Result};

/// Variance of the Horvitz–Thompson estimator of the total of `y`.
///
/// For a fixed-size design,
///
/// ```text
/// V(Ŷ_HT) = Σ_{i<j} (π_i π_j − π_ij) (y_i/π_i − y_j/π_j)²
/// ```
///
/// with `π_i` the bound target probabilities and `π_ij` taken from the
/// design's SIP. When the sample size is random the expression is the
/// usual Sen–Yates–Grundy approximation. Minimized.
///
/// # Examples
///
/// ```
/// use u_sampling::criteria::{Criterion, HtVariance};
/// use u_sampling::design::Design;
///
/// let fip = [0.5, 0.5, 0.5, 0.5];
/// let y = [1.0, 2.0, 3.0, 4.0];
/// let criterion = HtVariance::new(&y, &fip).unwrap();
/// let v = criterion.evaluate(&Design::from_fip(&fip).unwrap());
/// assert!(v > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct HtVariance {
    /// Expanded values `y_i / π_i`.
    expanded: Vec<f64>,
    fip: Vec<f64>,
}

impl HtVariance {
    /// Binds the study (or auxiliary) variable and target FIP.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if `y` and `fip` differ in length
    /// - `InvalidInclusionProbabilities` if some `π_i` is not in `(0, 1]`
    pub fn new(y: &[f64], fip: &[f64]) -> Result<Self> {
        if y.len() != fip.len() {
            return Err(Error::DimensionMismatch {
                expected: fip.len(),
                found: y.len(),
            });
        }
        if let Some(p) = fip.iter().find(|p| !(p.is_finite() && **p > 0.0 && **p <= 1.0)) {
            return Err(Error::InvalidInclusionProbabilities(format!(
                "variance criterion needs π in (0, 1], got {p}"
            )));
        }
        Ok(Self {
            expanded: y.iter().zip(fip).map(|(y, p)| y / p).collect(),
            fip: fip.to_vec(),
        })
    }
}

impl Criterion for HtVariance {
    fn evaluate(&self, design: &Design) -> f64 {
        let sip = design.sip();
        let n = self.fip.len().min(sip.len());
        let mut v = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.expanded[i] - self.expanded[j];
                v += (self.fip[i] * self.fip[j] - sip[i][j]) * d * d;
            }
        }
        v
    }

    fn direction(&self) -> Direction {
        Direction::Minimize
    }

    fn name(&self) -> &str {
        "ht_variance"
    }
}
