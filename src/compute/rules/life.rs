//! Life-like birth/survival rules (Game of Life is B3/S23).

use std::fmt;
use std::str::FromStr;

use crate::compute::{Life, NeighborhoodKind, SimRng};
use crate::schema::ConfigError;

use super::Rule;

/// Outer-totalistic Moore rule given by birth and survival neighbor counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeRule {
    birth: [bool; 9],
    survival: [bool; 9],
}

impl Default for LifeRule {
    fn default() -> Self {
        Self::conway()
    }
}

impl LifeRule {
    /// Conway's Game of Life, B3/S23.
    pub fn conway() -> Self {
        let mut birth = [false; 9];
        let mut survival = [false; 9];
        birth[3] = true;
        survival[2] = true;
        survival[3] = true;
        Self { birth, survival }
    }

    /// Build from neighbor counts (each 0-8).
    pub fn new(birth: &[u8], survival: &[u8]) -> Result<Self, ConfigError> {
        let mut rule = Self {
            birth: [false; 9],
            survival: [false; 9],
        };
        for &n in birth {
            *rule.birth.get_mut(n as usize).ok_or_else(|| count_error("birth", n))? = true;
        }
        for &n in survival {
            *rule
                .survival
                .get_mut(n as usize)
                .ok_or_else(|| count_error("survival", n))? = true;
        }
        Ok(rule)
    }

    /// Whether a dead cell with `n` live neighbors is born.
    #[inline]
    pub fn births(&self, n: usize) -> bool {
        self.birth.get(n).copied().unwrap_or(false)
    }

    /// Whether a live cell with `n` live neighbors survives.
    #[inline]
    pub fn survives(&self, n: usize) -> bool {
        self.survival.get(n).copied().unwrap_or(false)
    }
}

fn count_error(name: &str, n: u8) -> ConfigError {
    ConfigError::OutOfRange {
        name: name.to_string(),
        value: f64::from(n),
        min: 0.0,
        max: 8.0,
    }
}

impl FromStr for LifeRule {
    type Err = ConfigError;

    /// Parse `B<digits>/S<digits>` (case-insensitive, either order).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRulestring(s.to_string());

        let mut birth = None;
        let mut survival = None;
        for part in s.trim().split('/') {
            let mut chars = part.chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survival,
                _ => return Err(invalid()),
            };
            if slot.is_some() {
                return Err(invalid());
            }
            let counts = chars
                .map(|c| match c.to_digit(10) {
                    Some(d) if d <= 8 => Ok(d as u8),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<u8>, _>>()?;
            *slot = Some(counts);
        }

        match (birth, survival) {
            (Some(b), Some(s)) => LifeRule::new(&b, &s),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for LifeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for n in (0..9).filter(|&n| self.birth[n]) {
            write!(f, "{n}")?;
        }
        write!(f, "/S")?;
        for n in (0..9).filter(|&n| self.survival[n]) {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

impl Rule for LifeRule {
    type State = Life;

    fn neighborhood(&self) -> NeighborhoodKind {
        NeighborhoodKind::Moore
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    #[inline]
    fn next_state(&self, center: Life, neighbors: &[Life], _rng: &mut SimRng) -> Life {
        let live = neighbors.iter().filter(|c| c.is_alive()).count();
        let alive = match center {
            Life::Alive => self.survives(live),
            Life::Dead => self.births(live),
        };
        if alive { Life::Alive } else { Life::Dead }
    }

    fn set_parameter(&mut self, name: &str, _value: f64) -> Result<(), ConfigError> {
        Err(ConfigError::UnknownParameter(name.to_string()))
    }
}
