//! Random neighbour generation through composed switches.

use crate::design::{Design, Switch};
use crate::error::{Error, Result};
use rand::Rng;
use tracing::trace;

/// Random draws spent looking for one feasible switch.
const DRAWS_PER_SWITCH: usize = 8;

/// Candidate attempts per requested neighbour.
const ATTEMPTS_PER_NEIGHBOR: usize = 2;

/// Generates FIP-preserving neighbours of a design.
///
/// A neighbour is reached by composing between 1 and `num_changes`
/// elementary [`Switch`]es. Each switch picks a column holding at least two
/// units, two segments of different units in it, and exchanges pieces of
/// length `min(switch_coefficient, len_a, len_b)` aligned to the bottom or
/// top of their segments. Candidate switches are checked with
/// [`Design::check_switch`] before they are applied; infeasible ones are
/// skipped, so fewer neighbours than requested may come back.
///
/// # Examples
///
/// ```
/// use u_sampling::design::Design;
/// use u_sampling::random::create_rng;
/// use u_sampling::switch::SwitchEnumerator;
///
/// let design = Design::from_fip(&[0.5, 0.5, 0.5, 0.5]).unwrap();
/// let enumerator = SwitchEnumerator::new(0.1, 1).unwrap();
/// let mut rng = create_rng(42);
///
/// let neighbors = enumerator.neighbors(&design, 5, &mut rng);
/// assert!(neighbors.len() <= 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchEnumerator {
    switch_coefficient: f64,
    num_changes: usize,
}

impl SwitchEnumerator {
    /// Creates an enumerator.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` unless `0 < switch_coefficient <= 1` and
    /// `num_changes >= 1`.
    pub fn new(switch_coefficient: f64, num_changes: usize) -> Result<Self> {
        if !(switch_coefficient > 0.0 && switch_coefficient <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "switch_coefficient must lie in (0, 1], got {switch_coefficient}"
            )));
        }
        if num_changes == 0 {
            return Err(Error::InvalidConfig(
                "num_changes must be at least 1".into(),
            ));
        }
        Ok(Self {
            switch_coefficient,
            num_changes,
        })
    }

    /// Maximum piece length moved by one switch.
    pub fn switch_coefficient(&self) -> f64 {
        self.switch_coefficient
    }

    /// Maximum number of switches composed into one neighbour.
    pub fn num_changes(&self) -> usize {
        self.num_changes
    }

    /// Draws one feasible switch for `design`, if one is found quickly.
    pub fn random_switch<R: Rng>(&self, design: &Design, rng: &mut R) -> Option<Switch> {
        let eligible: Vec<usize> = (0..design.num_columns())
            .filter(|&c| {
                let col = design.column(c);
                col.iter().any(|s| s.unit != col[0].unit)
            })
            .collect();
        if eligible.is_empty() {
            return None;
        }

        for _ in 0..DRAWS_PER_SWITCH {
            let c = eligible[rng.random_range(0..eligible.len())];
            let col = design.column(c);
            let a = col[rng.random_range(0..col.len())];
            let b = col[rng.random_range(0..col.len())];
            if a.unit == b.unit {
                continue;
            }

            let amount = self.switch_coefficient.min(a.len()).min(b.len());
            let at_a = if rng.random_bool(0.5) {
                a.start
            } else {
                a.end - amount
            };
            let at_b = if rng.random_bool(0.5) {
                b.start
            } else {
                b.end - amount
            };
            let switch = Switch::new(a.unit, b.unit, c, amount, at_a, at_b);
            match design.check_switch(&switch) {
                Ok(()) => return Some(switch),
                Err(e) => trace!(column = c, error = %e, "skipping infeasible switch"),
            }
        }
        None
    }

    /// Produces one neighbour by composing up to `num_changes` switches.
    ///
    /// Returns `None` when not a single switch could be applied.
    pub fn neighbor<R: Rng>(&self, design: &Design, rng: &mut R) -> Option<Design> {
        let changes = rng.random_range(1..=self.num_changes);
        let mut current: Option<Design> = None;
        for _ in 0..changes {
            let base = current.as_ref().unwrap_or(design);
            let Some(switch) = self.random_switch(base, rng) else {
                continue;
            };
            if let Ok(next) = base.apply_switch(&switch) {
                current = Some(next);
            }
        }
        current
    }

    /// Produces up to `count` neighbours of `design`.
    pub fn neighbors<R: Rng>(&self, design: &Design, count: usize, rng: &mut R) -> Vec<Design> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count.saturating_mul(ATTEMPTS_PER_NEIGHBOR) {
            if out.len() >= count {
                break;
            }
            if let Some(next) = self.neighbor(design, rng) {
                out.push(next);
            }
        }
        out
    }
}
