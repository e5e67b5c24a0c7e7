//! Geometric design representation.
//!
//! A sampling design is drawn as bars: each population unit owns a bar of
//! length `π_i` cut into segments placed in `⌈n⌉` unit-height columns. One
//! uniform height selects, in every column, the unit whose segment covers
//! it. First-order inclusion probabilities are the bar lengths; second-order
//! ones are the height overlaps between bars.
//!
//! # Key Types
//!
//! - [`Design`]: immutable layout with SIP derivation and switches
//! - [`Switch`]: elementary FIP-preserving exchange inside one column
//! - [`BarLayout`]: plain snapshot for external renderers
//!
//! # References
//!
//! - Tillé (2006), *Sampling Algorithms*, §2.6 (systematic sampling as a
//!   single uniform draw over cumulated probabilities)
//! - Sen (1953), Yates & Grundy (1953) on joint inclusion probabilities

pub(crate) mod intervals;
mod layout;
mod types;

pub use layout::{Design, TOLERANCE};
pub use types::{BarLayout, BarSegment, ColumnBars, Segment, Switch};
