//! SIR / SIRS epidemic spread.

use rand::Rng;

use crate::compute::{Health, NeighborhoodKind, SimRng};
use crate::schema::{ConfigError, ensure_probability};

use super::Rule;

/// Epidemic rule. `p_lose_immunity == 0` is pure SIR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpidemicRule {
    p_infect: f64,
    p_recover: f64,
    p_lose_immunity: f64,
}

impl EpidemicRule {
    pub fn new(p_infect: f64, p_recover: f64, p_lose_immunity: f64) -> Result<Self, ConfigError> {
        let rule = Self {
            p_infect,
            p_recover,
            p_lose_immunity,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn p_infect(&self) -> f64 {
        self.p_infect
    }

    pub fn p_recover(&self) -> f64 {
        self.p_recover
    }

    pub fn p_lose_immunity(&self) -> f64 {
        self.p_lose_immunity
    }
}

impl Default for EpidemicRule {
    fn default() -> Self {
        Self {
            p_infect: 0.3,
            p_recover: 0.1,
            p_lose_immunity: 0.0,
        }
    }
}

impl Rule for EpidemicRule {
    type State = Health;

    fn neighborhood(&self) -> NeighborhoodKind {
        NeighborhoodKind::Moore
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_probability("p_infect", self.p_infect)?;
        ensure_probability("p_recover", self.p_recover)?;
        ensure_probability("p_lose_immunity", self.p_lose_immunity)?;
        Ok(())
    }

    fn next_state(&self, center: Health, neighbors: &[Health], rng: &mut SimRng) -> Health {
        match center {
            Health::Susceptible => {
                if neighbors.contains(&Health::Infected) && rng.gen_bool(self.p_infect) {
                    Health::Infected
                } else {
                    Health::Susceptible
                }
            }
            Health::Infected => {
                if rng.gen_bool(self.p_recover) {
                    Health::Recovered
                } else {
                    Health::Infected
                }
            }
            Health::Recovered => {
                if rng.gen_bool(self.p_lose_immunity) {
                    Health::Susceptible
                } else {
                    Health::Recovered
                }
            }
        }
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let slot = match name {
            "p_infect" => &mut self.p_infect,
            "p_recover" => &mut self.p_recover,
            "p_lose_immunity" => &mut self.p_lose_immunity,
            _ => return Err(ConfigError::UnknownParameter(name.to_string())),
        };
        *slot = ensure_probability(name, value)?;
        Ok(())
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("p_infect", self.p_infect),
            ("p_recover", self.p_recover),
            ("p_lose_immunity", self.p_lose_immunity),
        ]
    }

    fn is_stochastic(&self) -> bool {
        true
    }
}
