//! Logistic map, the single-cell degenerate case.

use crate::schema::{ConfigError, ensure_range};

/// `x' = r * x * (1 - x)` with `r` in `[0, 4]`.
///
/// Each iterate is clamped to `[0, 1]` to absorb floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticMap {
    r: f64,
}

impl LogisticMap {
    pub fn new(r: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            r: ensure_range("r", r, 0.0, 4.0)?,
        })
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn set_r(&mut self, r: f64) -> Result<(), ConfigError> {
        self.r = ensure_range("r", r, 0.0, 4.0)?;
        Ok(())
    }

    /// One iterate.
    #[inline]
    pub fn step(&self, x: f64) -> f64 {
        (self.r * x * (1.0 - x)).clamp(0.0, 1.0)
    }

    /// Non-trivial fixed point `1 - 1/r`, when it lies in `(0, 1)`.
    pub fn fixed_point(&self) -> Option<f64> {
        (self.r > 1.0).then(|| 1.0 - 1.0 / self.r)
    }

    /// Iterator over `x0, x1, x2, ...`.
    pub fn orbit(&self, x0: f64) -> Result<LogisticOrbit, ConfigError> {
        Ok(LogisticOrbit {
            map: *self,
            x: ensure_range("x0", x0, 0.0, 1.0)?,
        })
    }

    /// `x_n` starting from `x0`.
    pub fn iterate(&self, x0: f64, n: usize) -> Result<f64, ConfigError> {
        let mut x = ensure_range("x0", x0, 0.0, 1.0)?;
        for _ in 0..n {
            x = self.step(x);
        }
        Ok(x)
    }
}

/// Infinite orbit of a [`LogisticMap`].
#[derive(Debug, Clone)]
pub struct LogisticOrbit {
    map: LogisticMap,
    x: f64,
}

impl Iterator for LogisticOrbit {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let current = self.x;
        self.x = self.map.step(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_r_range() {
        assert!(LogisticMap::new(-0.1).is_err());
        assert!(LogisticMap::new(4.01).is_err());
        assert!(LogisticMap::new(4.0).is_ok());
        let mut map = LogisticMap::new(2.0).unwrap();
        assert!(map.set_r(5.0).is_err());
        assert_eq!(map.r(), 2.0);
    }

    #[test]
    fn test_orbit_starts_at_x0() {
        let map = LogisticMap::new(3.0).unwrap();
        let orbit: Vec<f64> = map.orbit(0.5).unwrap().take(3).collect();
        assert_eq!(orbit[0], 0.5);
        assert!((orbit[1] - 0.75).abs() < 1e-12);
        assert!((orbit[2] - 0.5625).abs() < 1e-12);
    }

    #[test]
    fn test_stays_in_unit_interval_at_r4() {
        let map = LogisticMap::new(4.0).unwrap();
        for x in map.orbit(0.123).unwrap().take(10_000) {
            assert!((0.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn test_bad_x0() {
        let map = LogisticMap::new(2.5).unwrap();
        assert!(map.orbit(1.5).is_err());
        assert!(map.iterate(-0.5, 3).is_err());
    }

    proptest! {
        #[test]
        fn prop_converges_to_fixed_point(x0 in 0.001f64..0.999) {
            let map = LogisticMap::new(2.5).unwrap();
            let fixed = map.fixed_point().unwrap();
            prop_assert!((fixed - 0.6).abs() < 1e-12);
            let x = map.iterate(x0, 200).unwrap();
            prop_assert!((x - fixed).abs() < 1e-9, "x0={} ended at {}", x0, x);
        }
    }
}
