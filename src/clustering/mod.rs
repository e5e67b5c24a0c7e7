//! Balanced soft clustering of population units.
//!
//! Clusters units that are close in a geometry space while driving every
//! cluster's weighted total of balancing features to zero. Membership is
//! fractional: a unit may be split across clusters, and each membership
//! row always sums to one.
//!
//! # Key Types
//!
//! - [`AggConfig`]: cluster count, tolerance, iteration budgets
//! - [`Agg`]: runs k-means++ seeding followed by the transfer loop
//! - [`AggResult`]: centroids, labels, memberships and cluster totals
//!
//! # References
//!
//! - Arthur & Vassilvitskii (2007), "k-means++: The Advantages of Careful Seeding"
//! - Grafström & Lundström (2013), "Why Well Spread Probability Samples Are Balanced"

mod agg;
mod config;
mod kmeans;

pub use agg::{Agg, AggResult};
pub use config::AggConfig;
