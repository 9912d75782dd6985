//! Continuous diffusion with linear decay.

use crate::compute::{NeighborhoodKind, SimRng};
use crate::schema::{ConfigError, ensure_probability};

use super::Rule;

/// Diffusion rule on concentrations in `[0, 1]`.
///
/// `next = (1 - alpha) * c + alpha * mean(neighbors) - decay * c`, clamped
/// to `[0, 1]`.
///
/// The mean is always taken over the full 8-cell Moore neighborhood. On a
/// finite grid a missing neighbor counts as equal to the cell itself, which
/// makes the edge a no-flux wall: with `decay == 0` the total is conserved
/// under both boundary policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionRule {
    alpha: f32,
    decay: f32,
}

impl DiffusionRule {
    pub fn new(alpha: f32, decay: f32) -> Result<Self, ConfigError> {
        let rule = Self { alpha, decay };
        rule.validate()?;
        Ok(rule)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }
}

impl Default for DiffusionRule {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            decay: 0.0,
        }
    }
}

impl Rule for DiffusionRule {
    type State = f32;

    fn neighborhood(&self) -> NeighborhoodKind {
        NeighborhoodKind::Moore
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_probability("alpha", f64::from(self.alpha))?;
        ensure_probability("decay", f64::from(self.decay))?;
        Ok(())
    }

    #[inline]
    fn next_state(&self, center: f32, neighbors: &[f32], _rng: &mut SimRng) -> f32 {
        let full = NeighborhoodKind::Moore.full_size();
        let missing = full.saturating_sub(neighbors.len());
        let sum: f32 = neighbors.iter().sum::<f32>() + missing as f32 * center;
        let mean = sum / full as f32;

        let next = (1.0 - self.alpha) * center + self.alpha * mean - self.decay * center;
        next.clamp(0.0, 1.0)
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let slot = match name {
            "alpha" => &mut self.alpha,
            "decay" => &mut self.decay,
            _ => return Err(ConfigError::UnknownParameter(name.to_string())),
        };
        *slot = ensure_probability(name, value)? as f32;
        Ok(())
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("alpha", f64::from(self.alpha)),
            ("decay", f64::from(self.decay)),
        ]
    }
}
