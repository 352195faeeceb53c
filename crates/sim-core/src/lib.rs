//! Shared simulation kernel
//!
//! Randomness primitives and rolling price statistics used by both the
//! market path simulator and the challenge evaluator.

pub mod rolling;
pub mod sampling;

pub use rolling::RollingWindow;
pub use sampling::{WeightedTable, rng_from_seed, standard_normal};
