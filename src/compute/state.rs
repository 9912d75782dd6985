//! Cell state domains.
//!
//! Each simulation family owns its own state type. They share the
//! [`CellState`] capability so that [`Grid`](super::Grid), the stepper and
//! the statistics code can stay generic.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::{BinaryStats, EpidemicStats, FieldStats, ForestStats, LifeStats};

/// Capability shared by every per-cell state domain.
pub trait CellState: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Per-grid aggregate produced by [`CellState::tally`].
    type Stats: Clone + Debug + PartialEq + Serialize;

    /// State of fresh cells and of off-grid lookups on finite grids.
    fn quiescent() -> Self;

    /// State written by randomized initialization.
    fn active() -> Self;

    /// Next state in the manual editing cycle.
    fn cycled(self) -> Self;

    /// Quantize a level in `[0, 1]` into this domain.
    fn from_level(level: f32) -> Self;

    /// Level in `[0, 1]` for rendering.
    fn level(self) -> f32;

    /// Character used by the text renderer.
    fn glyph(self) -> char;

    /// Aggregate a row-major cell slice.
    fn tally(cells: &[Self]) -> Self::Stats;

    /// Whether the value belongs to the domain. Enum domains are always valid.
    fn is_valid(self) -> bool {
        true
    }
}

/// Game of Life cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Life {
    #[default]
    Dead,
    Alive,
}

impl Life {
    #[inline]
    pub fn is_alive(self) -> bool {
        self == Life::Alive
    }
}

impl CellState for Life {
    type Stats = LifeStats;

    fn quiescent() -> Self {
        Life::Dead
    }

    fn active() -> Self {
        Life::Alive
    }

    fn cycled(self) -> Self {
        match self {
            Life::Dead => Life::Alive,
            Life::Alive => Life::Dead,
        }
    }

    fn from_level(level: f32) -> Self {
        if level >= 0.5 { Life::Alive } else { Life::Dead }
    }

    fn level(self) -> f32 {
        match self {
            Life::Dead => 0.0,
            Life::Alive => 1.0,
        }
    }

    fn glyph(self) -> char {
        match self {
            Life::Dead => '.',
            Life::Alive => '#',
        }
    }

    fn tally(cells: &[Self]) -> LifeStats {
        let alive = cells.iter().filter(|c| c.is_alive()).count();
        LifeStats {
            alive,
            dead: cells.len() - alive,
        }
    }
}

/// Elementary automaton cell: `false` is 0, `true` is 1.
impl CellState for bool {
    type Stats = BinaryStats;

    fn quiescent() -> Self {
        false
    }

    fn active() -> Self {
        true
    }

    fn cycled(self) -> Self {
        !self
    }

    fn from_level(level: f32) -> Self {
        level >= 0.5
    }

    fn level(self) -> f32 {
        if self { 1.0 } else { 0.0 }
    }

    fn glyph(self) -> char {
        if self { '#' } else { '.' }
    }

    fn tally(cells: &[Self]) -> BinaryStats {
        let active = cells.iter().filter(|c| **c).count();
        BinaryStats {
            active,
            inactive: cells.len() - active,
        }
    }
}

/// Forest fire cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Forest {
    #[default]
    Empty,
    Tree,
    Burning,
}

impl CellState for Forest {
    type Stats = ForestStats;

    fn quiescent() -> Self {
        Forest::Empty
    }

    fn active() -> Self {
        Forest::Tree
    }

    fn cycled(self) -> Self {
        match self {
            Forest::Empty => Forest::Tree,
            Forest::Tree => Forest::Burning,
            Forest::Burning => Forest::Empty,
        }
    }

    fn from_level(level: f32) -> Self {
        if level >= 0.5 {
            Forest::Tree
        } else {
            Forest::Empty
        }
    }

    fn level(self) -> f32 {
        match self {
            Forest::Empty => 0.0,
            Forest::Tree => 0.5,
            Forest::Burning => 1.0,
        }
    }

    fn glyph(self) -> char {
        match self {
            Forest::Empty => '.',
            Forest::Tree => 'T',
            Forest::Burning => '*',
        }
    }

    fn tally(cells: &[Self]) -> ForestStats {
        let mut stats = ForestStats::default();
        for cell in cells {
            match cell {
                Forest::Empty => stats.empty += 1,
                Forest::Tree => stats.trees += 1,
                Forest::Burning => stats.burning += 1,
            }
        }
        stats
    }
}

/// Epidemic (SIR) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Health {
    #[default]
    Susceptible,
    Infected,
    Recovered,
}

impl CellState for Health {
    type Stats = EpidemicStats;

    fn quiescent() -> Self {
        Health::Susceptible
    }

    fn active() -> Self {
        Health::Infected
    }

    fn cycled(self) -> Self {
        match self {
            Health::Susceptible => Health::Infected,
            Health::Infected => Health::Recovered,
            Health::Recovered => Health::Susceptible,
        }
    }

    fn from_level(level: f32) -> Self {
        if level >= 0.5 {
            Health::Infected
        } else {
            Health::Susceptible
        }
    }

    fn level(self) -> f32 {
        match self {
            Health::Susceptible => 0.0,
            Health::Infected => 1.0,
            Health::Recovered => 0.5,
        }
    }

    fn glyph(self) -> char {
        match self {
            Health::Susceptible => '.',
            Health::Infected => 'I',
            Health::Recovered => 'r',
        }
    }

    fn tally(cells: &[Self]) -> EpidemicStats {
        let mut stats = EpidemicStats::default();
        for cell in cells {
            match cell {
                Health::Susceptible => stats.susceptible += 1,
                Health::Infected => stats.infected += 1,
                Health::Recovered => stats.recovered += 1,
            }
        }
        stats
    }
}

const FIELD_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Continuous concentration in `[0, 1]`.
impl CellState for f32 {
    type Stats = FieldStats;

    fn quiescent() -> Self {
        0.0
    }

    fn active() -> Self {
        1.0
    }

    fn cycled(self) -> Self {
        if self >= 0.5 { 0.0 } else { 1.0 }
    }

    fn from_level(level: f32) -> Self {
        level.clamp(0.0, 1.0)
    }

    fn level(self) -> f32 {
        self
    }

    fn glyph(self) -> char {
        let idx = (self.clamp(0.0, 1.0) * (FIELD_RAMP.len() - 1) as f32).round() as usize;
        FIELD_RAMP[idx]
    }

    fn tally(cells: &[Self]) -> FieldStats {
        FieldStats::from_values(cells)
    }

    fn is_valid(self) -> bool {
        (0.0..=1.0).contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_cycles_return_home() {
        assert_eq!(Life::Dead.cycled().cycled(), Life::Dead);
        assert_eq!(Forest::Empty.cycled().cycled().cycled(), Forest::Empty);
        assert_eq!(
            Health::Susceptible.cycled(),
            Health::Infected,
            "susceptible -> infected"
        );
        assert_eq!(Health::Infected.cycled(), Health::Recovered);
        assert_eq!(Health::Recovered.cycled(), Health::Susceptible);
        assert!(false.cycled());
        assert_eq!(0.2f32.cycled(), 1.0);
        assert_eq!(0.8f32.cycled(), 0.0);
    }

    #[test]
    fn test_field_glyph_ramp_ends() {
        assert_eq!(0.0f32.glyph(), ' ');
        assert_eq!(1.0f32.glyph(), '@');
        assert_eq!(7.0f32.glyph(), '@');
    }

    #[test]
    fn test_tally_counts() {
        let cells = [Forest::Tree, Forest::Tree, Forest::Burning, Forest::Empty];
        assert_eq!(
            Forest::tally(&cells),
            ForestStats {
                empty: 1,
                trees: 2,
                burning: 1
            }
        );
    }
}
