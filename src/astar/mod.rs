//! Best-first ("A*") search over sampling designs.
//!
//! Starting from an initial [`Design`](crate::design::Design), the engine
//! repeatedly expands the frontier node with the lowest `f = g + h`, where
//! `g` counts switch steps from the root and `h` is the criterion value
//! oriented so that lower is better. Expansion asks the
//! [`SwitchEnumerator`](crate::switch::SwitchEnumerator) for random
//! FIP-preserving neighbours; a bounded [`OpenSet`] keeps the frontier
//! finite, and layout fingerprints suppress re-expansion of known designs.
//!
//! # Key Types
//!
//! - [`AStarConfig`]: iteration budget, branching, frontier capacity
//! - [`AStarEngine`]: binds initial design, criterion and switch magnitude
//! - [`AStarResult`]: best and last designs plus run statistics
//! - [`OpenSet`] / [`SearchNode`]: the bounded priority frontier
//!
//! # References
//!
//! - Hart, Nilsson & Raphael (1968), "A Formal Basis for the Heuristic
//!   Determination of Minimum Cost Paths"
//! - Russell & Norvig (2020), *Artificial Intelligence: A Modern Approach*, §3.5

mod config;
mod runner;
mod types;

pub use config::AStarConfig;
pub use runner::{AStarEngine, AStarResult};
pub use types::{OpenSet, SearchNode};
