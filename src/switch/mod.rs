//! Switch enumeration.
//!
//! The single mutation primitive of the crate: both the best-first engine
//! (node expansion) and the genetic algorithm (mutation) draw their moves
//! from a [`SwitchEnumerator`].

mod enumerator;

pub use enumerator::SwitchEnumerator;
