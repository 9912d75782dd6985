//! Runtime module - Simulation loop, scheduling and time sources.

mod clock;
mod dynamic;
mod error;
mod scheduler;
mod sim_loop;

pub use clock::*;
pub use dynamic::*;
pub use error::*;
pub use scheduler::*;
pub use sim_loop::*;
