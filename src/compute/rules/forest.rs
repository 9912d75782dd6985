//! Forest fire model (Drossel-Schwabl with optional partial spread).

use rand::Rng;

use crate::compute::{Forest, NeighborhoodKind, SimRng};
use crate::schema::{ConfigError, ensure_probability};

use super::Rule;

/// Forest fire rule.
///
/// - empty becomes a tree with probability `p_growth`
/// - a tree next to fire ignites with probability `p_spread`, otherwise it
///   may be struck by lightning with probability `p_lightning`
/// - burning cells burn out to empty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestFireRule {
    p_growth: f64,
    p_lightning: f64,
    p_spread: f64,
}

impl ForestFireRule {
    pub fn new(p_growth: f64, p_lightning: f64, p_spread: f64) -> Result<Self, ConfigError> {
        let rule = Self {
            p_growth,
            p_lightning,
            p_spread,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn p_growth(&self) -> f64 {
        self.p_growth
    }

    pub fn p_lightning(&self) -> f64 {
        self.p_lightning
    }

    pub fn p_spread(&self) -> f64 {
        self.p_spread
    }
}

impl Default for ForestFireRule {
    fn default() -> Self {
        Self {
            p_growth: 0.01,
            p_lightning: 0.0001,
            p_spread: 1.0,
        }
    }
}

impl Rule for ForestFireRule {
    type State = Forest;

    fn neighborhood(&self) -> NeighborhoodKind {
        NeighborhoodKind::Moore
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_probability("p_growth", self.p_growth)?;
        ensure_probability("p_lightning", self.p_lightning)?;
        ensure_probability("p_spread", self.p_spread)?;
        Ok(())
    }

    fn next_state(&self, center: Forest, neighbors: &[Forest], rng: &mut SimRng) -> Forest {
        match center {
            Forest::Empty => {
                if rng.gen_bool(self.p_growth) {
                    Forest::Tree
                } else {
                    Forest::Empty
                }
            }
            Forest::Tree => {
                let exposed = neighbors.contains(&Forest::Burning);
                if (exposed && rng.gen_bool(self.p_spread)) || rng.gen_bool(self.p_lightning) {
                    Forest::Burning
                } else {
                    Forest::Tree
                }
            }
            Forest::Burning => Forest::Empty,
        }
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let slot = match name {
            "p_growth" => &mut self.p_growth,
            "p_lightning" => &mut self.p_lightning,
            "p_spread" => &mut self.p_spread,
            _ => return Err(ConfigError::UnknownParameter(name.to_string())),
        };
        *slot = ensure_probability(name, value)?;
        Ok(())
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("p_growth", self.p_growth),
            ("p_lightning", self.p_lightning),
            ("p_spread", self.p_spread),
        ]
    }

    fn is_stochastic(&self) -> bool {
        true
    }
}
