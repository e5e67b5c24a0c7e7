//! Spatial spread of the sample.

use super::types::{Criterion, Direction};
use crate::design::Design;
use crate::error::{Error, Result};

/// Expected sum of pairwise distances between selected units.
///
/// ```text
/// S = Σ_{i<j} π_ij · ‖x_i − x_j‖
/// ```
///
/// Larger values mean units that are far apart tend to be selected
/// together, i.e. a well-spread sample. Maximized.
#[derive(Debug, Clone)]
pub struct SpreadCriterion {
    /// Pairwise Euclidean distances.
    distances: Vec<Vec<f64>>,
}

impl SpreadCriterion {
    /// Binds unit coordinates (any dimension, all rows equal length).
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the number of coordinate rows differs from
    /// the population size, or rows have unequal dimension.
    pub fn new(coords: &[Vec<f64>], fip: &[f64]) -> Result<Self> {
        if coords.len() != fip.len() {
            return Err(Error::DimensionMismatch {
                expected: fip.len(),
                found: coords.len(),
            });
        }
        let dim = coords.first().map_or(0, Vec::len);
        if let Some(row) = coords.iter().find(|r| r.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: row.len(),
            });
        }

        let n = coords.len();
        let distances = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        coords[i]
                            .iter()
                            .zip(&coords[j])
                            .map(|(a, b)| (a - b) * (a - b))
                            .sum::<f64>()
                            .sqrt()
                    })
                    .collect()
            })
            .collect();
        Ok(Self { distances })
    }
}

impl Criterion for SpreadCriterion {
    fn evaluate(&self, design: &Design) -> f64 {
        let sip = design.sip();
        let n = self.distances.len().min(sip.len());
        let mut s = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                s += sip[i][j] * self.distances[i][j];
            }
        }
        s
    }

    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn name(&self) -> &str {
        "spread"
    }
}
