//! Fixed-size cell grids with boundary-aware neighbor lookup.

use std::fmt;

use rand::Rng;

use super::{CellState, SimRng};
use crate::schema::{Boundary, ConfigError, Dimensionality, cell_count, ensure_probability};

/// Moore neighborhood offsets, row by row from the top-left.
pub const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Which cells count as neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborhoodKind {
    /// 8-connected, 2D grids.
    ///
    /// Gathers only the neighbors that exist: on a finite grid edge cells
    /// see fewer than 8, on a toroidal grid every cell sees 8.
    Moore,
    /// Left and right neighbor on a single row, always gathered as
    /// `[left, right]`. Off-grid neighbors on a finite row read as quiescent.
    Elementary,
}

impl NeighborhoodKind {
    /// Neighbor count of an interior cell.
    pub fn full_size(self) -> usize {
        match self {
            NeighborhoodKind::Moore => 8,
            NeighborhoodKind::Elementary => 2,
        }
    }

    /// Grid shape this neighborhood is defined on.
    pub fn dimensionality(self) -> Dimensionality {
        match self {
            NeighborhoodKind::Moore => Dimensionality::Plane,
            NeighborhoodKind::Elementary => Dimensionality::Row,
        }
    }
}

/// Row-major grid of cell states.
///
/// Grids are plain values: every editing operation returns a new grid and
/// leaves the receiver untouched, so a grid handed to a reader never
/// changes underneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<S> {
    width: usize,
    height: usize,
    boundary: Boundary,
    cells: Vec<S>,
}

impl<S: CellState> Grid<S> {
    /// Create a grid of quiescent cells.
    pub fn new(width: usize, height: usize, boundary: Boundary) -> Result<Self, ConfigError> {
        let len = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            boundary,
            cells: vec![S::quiescent(); len],
        })
    }

    /// Create a grid from row-major cells.
    pub fn from_cells(
        width: usize,
        height: usize,
        boundary: Boundary,
        cells: Vec<S>,
    ) -> Result<Self, ConfigError> {
        let len = cell_count(width, height)?;
        if cells.len() != len {
            return Err(ConfigError::CellCountMismatch {
                expected: len,
                actual: cells.len(),
            });
        }
        if let Some(i) = cells.iter().position(|c| !c.is_valid()) {
            return Err(ConfigError::InvalidCellValue {
                x: i % width,
                y: i / width,
            });
        }
        Ok(Self {
            width,
            height,
            boundary,
            cells,
        })
    }

    /// Same shape and boundary, new cells. Length is the caller's invariant.
    pub(crate) fn with_cells(&self, cells: Vec<S>) -> Self {
        debug_assert_eq!(cells.len(), self.cells.len());
        Self {
            width: self.width,
            height: self.height,
            boundary: self.boundary,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; grids have non-zero dimensions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major cells.
    #[inline]
    pub fn cells(&self) -> &[S] {
        &self.cells
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[S]> {
        self.cells.chunks(self.width)
    }

    /// Convert (x, y) coordinates to flat index.
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// In-range cell, or `None`.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> Option<S> {
        if x < self.width && y < self.height {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }

    /// Map possibly off-grid coordinates to a cell position under the
    /// boundary policy. `None` means off-grid on a finite grid.
    #[inline]
    pub fn resolve(&self, x: isize, y: isize) -> Option<(usize, usize)> {
        let (w, h) = (self.width as isize, self.height as isize);
        match self.boundary {
            Boundary::Toroidal => Some((x.rem_euclid(w) as usize, y.rem_euclid(h) as usize)),
            Boundary::Finite => {
                if (0..w).contains(&x) && (0..h).contains(&y) {
                    Some((x as usize, y as usize))
                } else {
                    None
                }
            }
        }
    }

    /// Boundary-aware lookup: wraps on toroidal grids, reads quiescent off a
    /// finite grid.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> S {
        match self.resolve(x, y) {
            Some((x, y)) => self.cells[self.idx(x, y)],
            None => S::quiescent(),
        }
    }

    /// Collect the neighbors of (x, y) into `out` (cleared first).
    pub fn gather(&self, x: usize, y: usize, kind: NeighborhoodKind, out: &mut Vec<S>) {
        out.clear();
        let (x, y) = (x as isize, y as isize);
        match kind {
            NeighborhoodKind::Moore => {
                for (dx, dy) in MOORE_OFFSETS {
                    if let Some((nx, ny)) = self.resolve(x + dx, y + dy) {
                        out.push(self.cells[self.idx(nx, ny)]);
                    }
                }
            }
            NeighborhoodKind::Elementary => {
                out.push(self.get(x - 1, y));
                out.push(self.get(x + 1, y));
            }
        }
    }

    /// Set one cell in place.
    pub fn set(&mut self, x: usize, y: usize, state: S) -> Result<(), ConfigError> {
        let idx = self.checked_idx(x, y)?;
        if !state.is_valid() {
            return Err(ConfigError::InvalidCellValue { x, y });
        }
        self.cells[idx] = state;
        Ok(())
    }

    /// This grid with one cell replaced.
    pub fn with_cell(mut self, x: usize, y: usize, state: S) -> Result<Self, ConfigError> {
        self.set(x, y, state)?;
        Ok(self)
    }

    /// Copy with one cell advanced along its editing cycle.
    pub fn with_cell_toggled(&self, x: usize, y: usize) -> Result<Self, ConfigError> {
        let idx = self.checked_idx(x, y)?;
        let mut next = self.clone();
        next.cells[idx] = next.cells[idx].cycled();
        Ok(next)
    }

    /// Reallocate to new dimensions, keeping cells inside both shapes at
    /// the same (x, y) and filling the rest with quiescent cells.
    pub fn resized(&self, width: usize, height: usize) -> Result<Self, ConfigError> {
        let mut next = Self::new(width, height, self.boundary)?;
        let copy_w = width.min(self.width);
        for y in 0..height.min(self.height) {
            let src = self.idx(0, y);
            let dst = next.idx(0, y);
            next.cells[dst..dst + copy_w].copy_from_slice(&self.cells[src..src + copy_w]);
        }
        Ok(next)
    }

    /// Copy where each cell is independently active with probability
    /// `density`, quiescent otherwise.
    pub fn randomized(&self, density: f64, rng: &mut SimRng) -> Result<Self, ConfigError> {
        let density = ensure_probability("density", density)?;
        let cells = (0..self.cells.len())
            .map(|_| {
                if rng.gen_bool(density) {
                    S::active()
                } else {
                    S::quiescent()
                }
            })
            .collect();
        Ok(self.with_cells(cells))
    }

    /// Copy with every cell quiescent.
    pub fn cleared(&self) -> Self {
        self.with_cells(vec![S::quiescent(); self.cells.len()])
    }

    /// Copy under a different boundary policy.
    pub fn with_boundary(&self, boundary: Boundary) -> Self {
        Self {
            boundary,
            ..self.clone()
        }
    }

    fn checked_idx(&self, x: usize, y: usize) -> Result<usize, ConfigError> {
        if x < self.width && y < self.height {
            Ok(self.idx(x, y))
        } else {
            Err(ConfigError::CellOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl<S: CellState> fmt::Display for Grid<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|c| c.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
