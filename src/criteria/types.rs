//! The [`Criterion`] contract and optimization direction.

use crate::design::Design;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether a criterion should be driven down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Lower values are better (e.g. estimator variance).
    #[default]
    Minimize,
    /// Higher values are better (e.g. sample spread).
    Maximize,
}

impl Direction {
    /// Maps a criterion value onto a cost where lower is always better.
    ///
    /// ```
    /// use u_sampling::criteria::Direction;
    ///
    /// assert_eq!(Direction::Minimize.cost(3.0), 3.0);
    /// assert_eq!(Direction::Maximize.cost(3.0), -3.0);
    /// ```
    pub fn cost(self, value: f64) -> f64 {
        match self {
            Direction::Minimize => value,
            Direction::Maximize => -value,
        }
    }

    /// Whether `candidate` is strictly better than `incumbent`.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        self.cost(candidate) < self.cost(incumbent)
    }

    /// The worst representable value in this direction.
    pub fn worst(self) -> f64 {
        match self {
            Direction::Minimize => f64::INFINITY,
            Direction::Maximize => f64::NEG_INFINITY,
        }
    }
}

/// A statistical objective over designs.
///
/// Implementations hold their auxiliary data (bound at construction) and
/// must be pure: the same design always yields the same value. Engines
/// only see this trait, so new criteria need no engine changes.
///
/// # Implementing
///
/// ```
/// use u_sampling::criteria::{Criterion, Direction};
/// use u_sampling::design::Design;
///
/// /// Joint probability of two fixed units appearing together.
/// struct PairInclusion(usize, usize);
///
/// impl Criterion for PairInclusion {
///     fn evaluate(&self, design: &Design) -> f64 {
///         design.sip()[self.0][self.1]
///     }
///     fn direction(&self) -> Direction {
///         Direction::Maximize
///     }
/// }
/// ```
pub trait Criterion: Send + Sync {
    /// Scores a design.
    fn evaluate(&self, design: &Design) -> f64;

    /// Optimization direction.
    fn direction(&self) -> Direction {
        Direction::Minimize
    }

    /// Short name for logs.
    fn name(&self) -> &str {
        "criterion"
    }

    /// Scores a design as a cost (lower is better).
    fn cost(&self, design: &Design) -> f64 {
        self.direction().cost(self.evaluate(design))
    }
}

impl<C: Criterion + ?Sized> Criterion for &C {
    fn evaluate(&self, design: &Design) -> f64 {
        (**self).evaluate(design)
    }
    fn direction(&self) -> Direction {
        (**self).direction()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<C: Criterion + ?Sized> Criterion for Box<C> {
    fn evaluate(&self, design: &Design) -> f64 {
        (**self).evaluate(design)
    }
    fn direction(&self) -> Direction {
        (**self).direction()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
