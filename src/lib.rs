//! Geometric sampling design search.
//!
//! A sampling design over `N` units with first-order inclusion
//! probabilities (FIP) `π` is represented as a layout of bars: `⌈Σπ⌉`
//! columns of height one, where unit `i` owns segments of total length
//! `π_i`. Drawing one uniform height selects every unit covering it, so
//! the layout fixes the joint (second-order) inclusion probabilities while
//! the FIP stay exact. Search engines rearrange the bars to optimize a
//! statistical criterion without ever changing `π`.
//!
//! - **Design**: immutable bar layouts, switches, SIP, fingerprints, draws
//! - **Criteria**: pluggable objectives with a declared direction
//!   (Horvitz–Thompson variance, expected sample spread)
//! - **Switch enumeration**: random FIP-preserving neighbours
//! - **Best-first ("A*") search**: bounded-frontier search with
//!   fingerprint deduplication
//! - **Genetic algorithm**: column crossover with FIP repair, switch
//!   mutation and elitism
//! - **Clustering**: balanced soft clustering of units
//!
//! # Architecture
//!
//! Designs are values: every switch or repair yields a new design and
//! untouched columns are shared between them. Randomness is always
//! supplied by the caller (see [`random::create_rng`]), so runs are
//! reproducible from a seed. The crate logs through `tracing` and leaves
//! subscriber setup to the application.

pub mod astar;
pub mod clustering;
pub mod criteria;
pub mod design;
mod error;
mod eval;
pub mod ga;
pub mod random;
pub mod switch;

pub use error::{Error, Result};
