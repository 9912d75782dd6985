//! Local update rules.
//!
//! A rule maps a cell and its gathered neighbors to the cell's next state.
//! Rules are pure: they see only their arguments and their own parameters,
//! and stochastic rules draw exclusively from the random source they are
//! handed.

mod diffusion;
mod elementary;
mod epidemic;
mod forest;
mod life;
mod logistic;

pub use diffusion::*;
pub use elementary::*;
pub use epidemic::*;
pub use forest::*;
pub use life::*;
pub use logistic::*;

use super::{CellState, NeighborhoodKind, SimRng};
use crate::schema::ConfigError;

/// Update rule for one simulation family.
pub trait Rule: Clone + Send + Sync {
    /// State domain the rule operates on.
    type State: CellState;

    /// Neighborhood the stepper gathers for each cell.
    fn neighborhood(&self) -> NeighborhoodKind;

    /// Check every parameter against its declared range.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Next state of a cell.
    ///
    /// `neighbors` is what [`Grid::gather`](super::Grid::gather) produced for
    /// [`Rule::neighborhood`].
    fn next_state(
        &self,
        center: Self::State,
        neighbors: &[Self::State],
        rng: &mut SimRng,
    ) -> Self::State;

    /// Set a numeric parameter by name. On error the rule is unchanged.
    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError>;

    /// Numeric parameters and their current values.
    fn parameters(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }

    /// Whether `next_state` draws from the random source.
    fn is_stochastic(&self) -> bool {
        false
    }
}
