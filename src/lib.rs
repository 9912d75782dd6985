//! Grid Automata - Discrete cellular automata on finite and toroidal grids.
//!
//! This crate provides a generic engine for synchronous grid automata:
//! Conway's Life and other birth/survival rules, forest fire, SIR/SIRS
//! epidemics, Wolfram elementary automata and continuous diffusion.
//!
//! # Architecture
//!
//! The crate is split into three main modules:
//!
//! - `schema`: Configuration types and seed patterns
//! - `compute`: Grids, cell states, rules, the stepper and statistics
//! - `runtime`: The play/pause simulation loop, its scheduler and clocks
//!
//! # Example
//!
//! ```rust,no_run
//! use grid_automata::{
//!     compute::{Grid, Life, LifeRule, Stepper},
//!     schema::Boundary,
//! };
//!
//! // A glider on a 20x20 finite grid
//! let mut grid = Grid::new(20, 20, Boundary::Finite).unwrap();
//! for (x, y) in [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
//!     grid.set(x, y, Life::Alive).unwrap();
//! }
//!
//! let mut stepper = Stepper::new(LifeRule::conway(), 42).unwrap();
//! let grid = stepper.run(&grid, 4).unwrap();
//!
//! println!("Generation {}:\n{}", stepper.generation(), grid);
//! ```

pub mod compute;
pub mod runtime;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{Grid, Rule, Stepper, StatisticsSnapshot};
pub use runtime::{AnySimulation, EngineError, SimulationLoop};
pub use schema::{Boundary, Pattern, RuleConfig, SimulationConfig};
