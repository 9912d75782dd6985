//! Per-generation statistics derived from grid snapshots.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{CellState, Grid};

/// Game of Life population counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifeStats {
    pub alive: usize,
    pub dead: usize,
}

/// Elementary automaton counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BinaryStats {
    pub active: usize,
    pub inactive: usize,
}

/// Forest fire counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForestStats {
    pub empty: usize,
    pub trees: usize,
    pub burning: usize,
}

/// SIR compartment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpidemicStats {
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
}

/// Continuous field summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub sum: f32,
}

impl FieldStats {
    /// Summarize a slice of values. An empty slice yields all zeros.
    pub fn from_values(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                sum: 0.0,
            };
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        // f64 accumulator keeps conservation checks meaningful on large grids
        let mut sum = 0.0f64;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += f64::from(v);
        }

        Self {
            min,
            max,
            mean: (sum / values.len() as f64) as f32,
            sum: sum as f32,
        }
    }
}

/// Statistics of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot<T> {
    pub generation: u64,
    pub stats: T,
}

/// Compute the statistics of a grid snapshot.
pub fn summarize<S: CellState>(grid: &Grid<S>, generation: u64) -> StatisticsSnapshot<S::Stats> {
    StatisticsSnapshot {
        generation,
        stats: S::tally(grid.cells()),
    }
}

/// Bounded history of per-generation statistics, oldest first.
#[derive(Debug, Clone)]
pub struct StatsHistory<T> {
    capacity: usize,
    entries: VecDeque<StatisticsSnapshot<T>>,
}

impl<T> StatsHistory<T> {
    /// Create a history holding at most `capacity` entries (0 keeps nothing).
    ///
    /// Storage grows with the entries pushed, not with `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Append a snapshot, evicting the oldest when full.
    pub fn push(&mut self, snapshot: StatisticsSnapshot<T>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&StatisticsSnapshot<T>> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatisticsSnapshot<T>> {
        self.entries.iter()
    }
}
