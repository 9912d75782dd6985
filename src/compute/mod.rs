//! Compute module - Grids, rules, stepping and statistics.

mod grid;
mod rng;
mod rules;
mod state;
mod stats;
mod stepper;

pub use grid::*;
pub use rng::{SimRng, sim_rng};
pub use rules::*;
pub use state::*;
pub use stats::*;
pub use stepper::*;
