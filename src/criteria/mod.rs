//! Pluggable design criteria.
//!
//! A criterion maps a [`Design`](crate::design::Design) to a real score and
//! declares whether that score should be minimized or maximized. Engines
//! are generic over [`Criterion`] and never special-case a variant.
//!
//! # Provided Criteria
//!
//! - [`HtVariance`]: Horvitz–Thompson variance, Sen–Yates–Grundy form (minimize)
//! - [`SpreadCriterion`]: expected pairwise distance within the sample (maximize)
//!
//! # References
//!
//! - Horvitz & Thompson (1952), "A Generalization of Sampling Without
//!   Replacement From a Finite Universe"
//! - Sen (1953); Yates & Grundy (1953)
//! - Stevens & Olsen (2004), "Spatially Balanced Sampling of Natural Resources"

mod spread;
mod types;
mod variance;

pub use spread::SpreadCriterion;
pub use types::{Criterion, Direction};
pub use variance::HtVariance;
