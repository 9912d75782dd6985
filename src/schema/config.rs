//! Configuration types for grid automaton simulations.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Pattern;

fn default_interval_ms() -> u64 {
    100
}

fn default_rulestring() -> String {
    "B3/S23".to_string()
}

fn default_spread() -> f64 {
    1.0
}

/// Edge policy for neighbor lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// No wraparound; edge cells have fewer neighbors.
    Finite,
    /// Coordinates wrap modulo width/height.
    #[default]
    Toroidal,
}

/// What the scheduler does when several tick deadlines passed between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateTicks {
    /// Fire a single step and drop the missed ticks.
    #[default]
    Coalesce,
    /// Fire missed ticks back to back, at most `max_ticks` per poll.
    CatchUp { max_ticks: u32 },
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells. Use 1 for elementary automata.
    pub height: usize,
    /// Neighbor lookup policy at the grid edge.
    #[serde(default)]
    pub boundary: Boundary,
    /// Interval between automatic steps while running.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Seed for the random source shared by stochastic rules and patterns.
    #[serde(default)]
    pub seed: u64,
    /// Late tick handling.
    #[serde(default)]
    pub late_ticks: LateTicks,
    /// Number of per-generation statistics kept (0 disables history).
    #[serde(default)]
    pub history_len: usize,
    /// Update rule and its parameters.
    pub rule: RuleConfig,
    /// Initial cell pattern.
    #[serde(default)]
    pub pattern: Pattern,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            boundary: Boundary::Toroidal,
            interval_ms: default_interval_ms(),
            seed: 0,
            late_ticks: LateTicks::Coalesce,
            history_len: 0,
            rule: RuleConfig::default(),
            pattern: Pattern::Random { density: 0.3 },
        }
    }
}

/// Rule selection with per-rule parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConfig {
    /// Life-like birth/survival rule.
    Life {
        #[serde(default = "default_rulestring")]
        rulestring: String,
    },
    /// Forest fire with regrowth and lightning.
    ForestFire {
        p_growth: f64,
        p_lightning: f64,
        /// Probability that a burning neighbor ignites a tree.
        #[serde(default = "default_spread")]
        p_spread: f64,
    },
    /// SIR/SIRS epidemic.
    Epidemic {
        p_infect: f64,
        p_recover: f64,
        /// Zero gives permanent immunity (pure SIR).
        #[serde(default)]
        p_lose_immunity: f64,
    },
    /// Wolfram elementary automaton on a single row.
    Elementary { rule: u8 },
    /// Continuous diffusion with decay.
    Diffusion {
        alpha: f32,
        #[serde(default)]
        decay: f32,
    },
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig::Life {
            rulestring: default_rulestring(),
        }
    }
}

impl RuleConfig {
    /// Short name used in logs and the CLI banner.
    pub fn name(&self) -> &'static str {
        match self {
            RuleConfig::Life { .. } => "life",
            RuleConfig::ForestFire { .. } => "forest_fire",
            RuleConfig::Epidemic { .. } => "epidemic",
            RuleConfig::Elementary { .. } => "elementary",
            RuleConfig::Diffusion { .. } => "diffusion",
        }
    }
}

impl SimulationConfig {
    /// Total number of cells, if the shape is acceptable.
    #[inline]
    pub fn grid_size(&self) -> Result<usize, ConfigError> {
        cell_count(self.width, self.height)
    }

    /// Validate configuration parameters.
    ///
    /// Rule parameters are range-checked by the rules themselves when the
    /// simulation is built; this covers the structural constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        cell_count(self.width, self.height)?;
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if let LateTicks::CatchUp { max_ticks: 0 } = self.late_ticks {
            return Err(ConfigError::OutOfRange {
                name: "max_ticks".to_string(),
                value: 0.0,
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }
        let expected = match self.rule {
            RuleConfig::Elementary { .. } => Dimensionality::Row,
            _ => Dimensionality::Plane,
        };
        if expected.accepts(self.width, self.height).is_err() {
            return Err(ConfigError::DimensionMismatch {
                expected,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Read and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Shape a rule expects its grid to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimensionality {
    /// One row (height 1).
    Row,
    /// Two or more rows.
    Plane,
}

impl Dimensionality {
    /// Check a `width` x `height` grid against this shape.
    pub fn accepts(self, width: usize, height: usize) -> Result<(), ConfigError> {
        let ok = match self {
            Dimensionality::Row => height == 1,
            Dimensionality::Plane => height > 1,
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::DimensionMismatch {
                expected: self,
                width,
                height,
            })
        }
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimensionality::Row => write!(f, "1D (single row)"),
            Dimensionality::Plane => write!(f, "2D"),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Step interval must be positive")]
    InvalidInterval,
    #[error("Parameter `{name}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Unknown rule parameter `{0}`")]
    UnknownParameter(String),
    #[error("Grid {width}x{height} exceeds the {max} cell limit")]
    GridTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
    #[error("Cell ({x}, {y}) holds a value outside its state domain")]
    InvalidCellValue { x: usize, y: usize },
    #[error("Expected {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("Rule expects a {expected} grid, got {width}x{height}")]
    DimensionMismatch {
        expected: Dimensionality,
        width: usize,
        height: usize,
    },
    #[error("Invalid rulestring `{0}` (expected B<digits>/S<digits>)")]
    InvalidRulestring(String),
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Largest grid accepted, in cells.
pub const MAX_CELLS: usize = 1 << 28;

/// Number of cells in a `width` x `height` grid.
///
/// Rejects empty shapes and shapes whose cell count overflows or exceeds
/// [`MAX_CELLS`].
pub fn cell_count(width: usize, height: usize) -> Result<usize, ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .filter(|&n| n <= MAX_CELLS)
        .ok_or(ConfigError::GridTooLarge {
            width,
            height,
            max: MAX_CELLS,
        })
}

/// Check that `value` lies in `[min, max]`.
pub fn ensure_range(name: &str, value: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Check that `value` is a probability.
#[inline]
pub fn ensure_probability(name: &str, value: f64) -> Result<f64, ConfigError> {
    ensure_range(name, value, 0.0, 1.0)
}

/// Errors from [`SimulationConfig::load`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}
