//! Wolfram elementary cellular automata.

use crate::compute::{NeighborhoodKind, SimRng};
use crate::schema::{ConfigError, ensure_range};

use super::Rule;

/// Elementary rule `0..=255`.
///
/// Bit `k` of the rule number is the next state for the neighborhood
/// pattern `k = 4 * left + 2 * center + right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementaryRule {
    rule: u8,
}

impl ElementaryRule {
    pub fn new(rule: u8) -> Self {
        Self { rule }
    }

    pub fn number(&self) -> u8 {
        self.rule
    }

    /// Output for a (left, center, right) pattern.
    #[inline]
    pub fn output(&self, left: bool, center: bool, right: bool) -> bool {
        let pattern = (left as u8) << 2 | (center as u8) << 1 | (right as u8);
        (self.rule >> pattern) & 1 == 1
    }
}

impl Rule for ElementaryRule {
    type State = bool;

    fn neighborhood(&self) -> NeighborhoodKind {
        NeighborhoodKind::Elementary
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    #[inline]
    fn next_state(&self, center: bool, neighbors: &[bool], _rng: &mut SimRng) -> bool {
        let left = neighbors.first().copied().unwrap_or(false);
        let right = neighbors.get(1).copied().unwrap_or(false);
        self.output(left, center, right)
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        if name != "rule" {
            return Err(ConfigError::UnknownParameter(name.to_string()));
        }
        let value = ensure_range(name, value, 0.0, 255.0)?;
        if value.fract() != 0.0 {
            return Err(ConfigError::OutOfRange {
                name: name.to_string(),
                value,
                min: 0.0,
                max: 255.0,
            });
        }
        self.rule = value as u8;
        Ok(())
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![("rule", f64::from(self.rule))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_30_table() {
        // 30 = 0b00011110: patterns 1..=4 map to 1
        let rule = ElementaryRule::new(30);
        let expected = [false, true, true, true, true, false, false, false];
        for (k, &out) in expected.iter().enumerate() {
            let (l, c, r) = (k & 4 != 0, k & 2 != 0, k & 1 != 0);
            assert_eq!(rule.output(l, c, r), out, "pattern {k:03b}");
        }
    }

    #[test]
    fn test_rule_90_is_xor() {
        let rule = ElementaryRule::new(90);
        for k in 0..8 {
            let (l, c, r) = (k & 4 != 0, k & 2 != 0, k & 1 != 0);
            assert_eq!(rule.output(l, c, r), l ^ r);
        }
    }

    #[test]
    fn test_set_rule_parameter() {
        let mut rule = ElementaryRule::new(30);
        rule.set_parameter("rule", 110.0).unwrap();
        assert_eq!(rule.number(), 110);
        assert!(rule.set_parameter("rule", 256.0).is_err());
        assert!(rule.set_parameter("rule", 12.5).is_err());
        assert!(rule.set_parameter("width", 3.0).is_err());
        assert_eq!(rule.number(), 110);
    }
}
