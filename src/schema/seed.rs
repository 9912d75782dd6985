//! Seed patterns for initializing grids.

use serde::{Deserialize, Serialize};

use super::{ConfigError, ensure_probability};
use crate::compute::{CellState, Grid, SimRng};

/// Predefined patterns for initialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pattern {
    /// Every cell quiescent.
    #[default]
    Empty,
    /// Each cell independently active with probability `density`.
    Random { density: f64 },
    /// A single active cell at the grid center.
    Center,
    /// Listed cells active, everything else quiescent.
    Cells { cells: Vec<(usize, usize)> },
    /// Gaussian bump, quantized to the state domain.
    GaussianBlob {
        /// Center position as fraction of grid size (0.0-1.0).
        center: (f32, f32),
        /// Radius as fraction of grid size.
        radius: f32,
        /// Peak level.
        amplitude: f32,
    },
}

impl Pattern {
    /// Build a grid of the given shape from this pattern.
    pub fn generate<S: CellState>(
        &self,
        blank: Grid<S>,
        rng: &mut SimRng,
    ) -> Result<Grid<S>, ConfigError> {
        let width = blank.width();
        let height = blank.height();

        match self {
            Pattern::Empty => Ok(blank),
            Pattern::Random { density } => blank.randomized(*density, rng),
            Pattern::Center => blank.with_cell(width / 2, height / 2, S::active()),
            Pattern::Cells { cells } => {
                let mut grid = blank;
                for &(x, y) in cells {
                    grid.set(x, y, S::active())?;
                }
                Ok(grid)
            }
            Pattern::GaussianBlob {
                center,
                radius,
                amplitude,
            } => {
                ensure_probability("amplitude", f64::from(*amplitude))?;
                let cx = center.0 * width as f32;
                let cy = center.1 * height as f32;
                let r = radius * width.min(height) as f32;
                let sigma_sq = (r / 2.0).powi(2).max(f32::EPSILON);

                let mut grid = blank;
                for y in 0..height {
                    for x in 0..width {
                        let dx = x as f32 - cx;
                        let dy = y as f32 - cy;
                        let level = amplitude * (-(dx * dx + dy * dy) / (2.0 * sigma_sq)).exp();
                        grid.set(x, y, S::from_level(level))?;
                    }
                }
                Ok(grid)
            }
        }
    }
}
