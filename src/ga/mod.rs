//! Genetic algorithm over sampling designs.
//!
//! A population of [`Design`](crate::design::Design)s is evolved under a
//! pluggable [`Criterion`](crate::criteria::Criterion). Children are built
//! by column-wise crossover, repaired back onto the target FIP, and
//! mutated by random switch walks, so every member of every generation is
//! a valid layout.
//!
//! # Key Types
//!
//! - [`GaConfig`]: population, rates, selection, termination
//! - [`GaEngine`]: binds the seed design and criterion; runs the loop
//! - [`GaResult`]: best design plus the best-of-generation history
//! - [`Selection`]: tournament, roulette and rank selection over costs
//!
//! # Submodules
//!
//! - [`operators`]: column crossover and FIP repair
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
pub mod operators;
mod runner;
mod selection;

pub use config::GaConfig;
pub use runner::{GaEngine, GaResult};
pub use selection::Selection;
