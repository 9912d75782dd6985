//! Rule selection at runtime.
//!
//! [`SimulationLoop`] is generic over the rule; front ends that pick the rule
//! from a config file (the CLI, the wasm bindings) go through
//! [`AnySimulation`] instead.

use serde::Serialize;

use super::{Clock, EngineError, ErrorSink, LoopOptions, LoopState, SimulationLoop};
use crate::compute::{
    CellState, DiffusionRule, ElementaryRule, EpidemicRule, ForestFireRule, Grid, LifeRule, Rule,
};
use crate::schema::{Boundary, Pattern, RuleConfig, SimulationConfig};

/// A simulation loop for any of the built-in rule families.
pub enum AnySimulation<C: Clock> {
    Life(SimulationLoop<LifeRule, C>),
    ForestFire(SimulationLoop<ForestFireRule, C>),
    Epidemic(SimulationLoop<EpidemicRule, C>),
    Elementary(SimulationLoop<ElementaryRule, C>),
    Diffusion(SimulationLoop<DiffusionRule, C>),
}

macro_rules! dispatch {
    ($self:expr, $sim:ident => $body:expr) => {
        match $self {
            AnySimulation::Life($sim) => $body,
            AnySimulation::ForestFire($sim) => $body,
            AnySimulation::Epidemic($sim) => $body,
            AnySimulation::Elementary($sim) => $body,
            AnySimulation::Diffusion($sim) => $body,
        }
    };
}

/// Render-friendly view of the current grid.
#[derive(Debug, Clone, Serialize)]
pub struct GridView {
    pub width: usize,
    pub height: usize,
    pub generation: u64,
    pub running: bool,
    /// Row-major cell levels in `[0, 1]`.
    pub levels: Vec<f32>,
}

fn build<R: Rule, C: Clock>(
    config: &SimulationConfig,
    rule: R,
    clock: C,
) -> Result<SimulationLoop<R, C>, EngineError> {
    let grid = Grid::<R::State>::new(config.width, config.height, config.boundary)?;
    let mut sim = SimulationLoop::new(grid, rule, LoopOptions::from_config(config), clock)?;
    sim.load_pattern(&config.pattern)?;
    Ok(sim)
}

impl<C: Clock> AnySimulation<C> {
    /// Build a paused simulation from a validated config.
    pub fn from_config(config: &SimulationConfig, clock: C) -> Result<Self, EngineError> {
        config.validate()?;

        let sim = match &config.rule {
            RuleConfig::Life { rulestring } => {
                AnySimulation::Life(build(config, rulestring.parse::<LifeRule>()?, clock)?)
            }
            RuleConfig::ForestFire {
                p_growth,
                p_lightning,
                p_spread,
            } => {
                let rule = ForestFireRule::new(*p_growth, *p_lightning, *p_spread)?;
                AnySimulation::ForestFire(build(config, rule, clock)?)
            }
            RuleConfig::Epidemic {
                p_infect,
                p_recover,
                p_lose_immunity,
            } => {
                let rule = EpidemicRule::new(*p_infect, *p_recover, *p_lose_immunity)?;
                AnySimulation::Epidemic(build(config, rule, clock)?)
            }
            RuleConfig::Elementary { rule } => {
                AnySimulation::Elementary(build(config, ElementaryRule::new(*rule), clock)?)
            }
            RuleConfig::Diffusion { alpha, decay } => {
                let rule = DiffusionRule::new(*alpha, *decay)?;
                AnySimulation::Diffusion(build(config, rule, clock)?)
            }
        };

        log::info!(
            "Built {} simulation: {}x{} ({:?} boundary)",
            sim.rule_name(),
            config.width,
            config.height,
            config.boundary
        );
        Ok(sim)
    }

    pub fn rule_name(&self) -> &'static str {
        match self {
            AnySimulation::Life(_) => "life",
            AnySimulation::ForestFire(_) => "forest_fire",
            AnySimulation::Epidemic(_) => "epidemic",
            AnySimulation::Elementary(_) => "elementary",
            AnySimulation::Diffusion(_) => "diffusion",
        }
    }

    pub fn state(&self) -> LoopState {
        dispatch!(self, sim => sim.state())
    }

    pub fn is_running(&self) -> bool {
        dispatch!(self, sim => sim.is_running())
    }

    pub fn generation(&self) -> u64 {
        dispatch!(self, sim => sim.generation())
    }

    pub fn width(&self) -> usize {
        dispatch!(self, sim => sim.grid().width())
    }

    pub fn height(&self) -> usize {
        dispatch!(self, sim => sim.grid().height())
    }

    pub fn dropped_ticks(&self) -> u64 {
        dispatch!(self, sim => sim.dropped_ticks())
    }

    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        dispatch!(self, sim => sim.rule().parameters())
    }

    pub fn play(&mut self) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.play())
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.pause())
    }

    pub fn step_once(&mut self) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.step_once())
    }

    pub fn poll(&mut self) -> u64 {
        dispatch!(self, sim => sim.poll())
    }

    pub fn run_ticks(&mut self, ticks: u64) -> Result<u64, EngineError> {
        dispatch!(self, sim => sim.run_ticks(ticks))
    }

    pub fn set_speed(&mut self, interval_ms: u64) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.set_speed(interval_ms))
    }

    pub fn set_rule_parameter(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.set_rule_parameter(name, value))
    }

    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.toggle_cell(x, y))
    }

    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.resize(width, height))
    }

    pub fn randomize(&mut self, density: f64) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.randomize(density))
    }

    pub fn clear(&mut self) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.clear())
    }

    pub fn load_pattern(&mut self, pattern: &Pattern) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.load_pattern(pattern))
    }

    pub fn set_boundary(&mut self, boundary: Boundary) -> Result<(), EngineError> {
        dispatch!(self, sim => sim.set_boundary(boundary))
    }

    pub fn set_error_sink(&mut self, sink: ErrorSink) {
        dispatch!(self, sim => sim.set_error_sink(sink))
    }

    pub fn teardown(&mut self) {
        dispatch!(self, sim => sim.teardown())
    }

    /// Current statistics as JSON (`{"generation": .., "stats": {..}}`).
    pub fn statistics_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        dispatch!(self, sim => serde_json::to_value(sim.statistics()))
    }

    /// Retained statistics history as a JSON array, oldest first.
    pub fn history_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        dispatch!(self, sim => {
            let history: Vec<_> = sim.history().iter().collect();
            serde_json::to_value(history)
        })
    }

    pub fn view(&self) -> GridView {
        dispatch!(self, sim => {
            let grid = sim.grid();
            GridView {
                width: grid.width(),
                height: grid.height(),
                generation: sim.generation(),
                running: sim.is_running(),
                levels: grid.cells().iter().map(|c| c.level()).collect(),
            }
        })
    }

    /// ASCII rendering of the current grid, one line per row.
    pub fn render(&self) -> String {
        dispatch!(self, sim => sim.grid().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualClock;
    use crate::schema::ConfigError;

    fn parse(json: &str) -> SimulationConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_builds_every_rule_family() {
        let configs = [
            r#"{"width": 8, "height": 8, "rule": {"type": "life"}}"#,
            r#"{"width": 8, "height": 8, "rule": {"type": "forest_fire", "p_growth": 0.1, "p_lightning": 0.01}}"#,
            r#"{"width": 8, "height": 8, "rule": {"type": "epidemic", "p_infect": 0.3, "p_recover": 0.1}}"#,
            r#"{"width": 32, "height": 1, "rule": {"type": "elementary", "rule": 110}}"#,
            r#"{"width": 8, "height": 8, "rule": {"type": "diffusion", "alpha": 0.5}}"#,
        ];
        let names = ["life", "forest_fire", "epidemic", "elementary", "diffusion"];

        for (json, name) in configs.iter().zip(names) {
            let config = parse(json);
            let mut sim = AnySimulation::from_config(&config, ManualClock::new()).unwrap();
            assert_eq!(sim.rule_name(), name);
            assert_eq!(sim.rule_name(), config.rule.name());
            sim.step_once().unwrap();
            assert_eq!(sim.generation(), 1);
        }
    }

    #[test]
    fn test_glider_from_config() {
        let config = parse(
            r#"{
                "width": 10, "height": 10, "boundary": "finite",
                "rule": {"type": "life", "rulestring": "B3/S23"},
                "pattern": {"type": "cells", "cells": [[1,0],[2,1],[0,2],[1,2],[2,2]]}
            }"#,
        );
        let mut sim = AnySimulation::from_config(&config, ManualClock::new()).unwrap();
        assert_eq!(sim.generation(), 0);
        sim.run_ticks(4).unwrap();
        assert_eq!(sim.generation(), 4);

        let stats = sim.statistics_json().unwrap();
        assert_eq!(stats["generation"], 4);
        assert_eq!(stats["stats"]["alive"], 5);

        let view = sim.view();
        assert_eq!(view.levels.len(), 100);
        assert_eq!(view.levels[3 * 10 + 2], 1.0);
    }

    #[test]
    fn test_bad_rule_parameters_rejected() {
        let config = parse(
            r#"{"width": 8, "height": 8, "rule": {"type": "forest_fire", "p_growth": 1.5, "p_lightning": 0.0}}"#,
        );
        assert!(matches!(
            AnySimulation::from_config(&config, ManualClock::new()),
            Err(EngineError::Config(ConfigError::OutOfRange { .. }))
        ));

        let config = parse(r#"{"width": 8, "height": 8, "rule": {"type": "life", "rulestring": "B9/S23"}}"#);
        assert!(AnySimulation::from_config(&config, ManualClock::new()).is_err());
    }

    #[test]
    fn test_oversized_grid_is_a_config_error() {
        let config = parse(
            r#"{"width": 4294967297, "height": 4294967296, "rule": {"type": "life"}}"#,
        );
        assert!(matches!(
            AnySimulation::from_config(&config, ManualClock::new()),
            Err(EngineError::Config(ConfigError::GridTooLarge { .. }))
        ));

        let config = parse(r#"{"width": 8, "height": 8, "rule": {"type": "life"}}"#);
        let mut sim = AnySimulation::from_config(&config, ManualClock::new()).unwrap();
        assert!(matches!(
            sim.resize(4_294_967_297, 4_294_967_296),
            Err(EngineError::Config(ConfigError::GridTooLarge { .. }))
        ));
        assert_eq!((sim.width(), sim.height()), (8, 8));
        sim.step_once().unwrap();
    }

    #[test]
    fn test_huge_history_len_builds() {
        let config = parse(
            r#"{"width": 8, "height": 8, "history_len": 18446744073709551615,
                "rule": {"type": "life"}}"#,
        );
        let mut sim = AnySimulation::from_config(&config, ManualClock::new()).unwrap();
        sim.step_once().unwrap();
        let history = sim.history_json().unwrap();
        assert_eq!(history.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_pattern_out_of_grid_rejected() {
        let config = parse(
            r#"{"width": 4, "height": 4, "rule": {"type": "life"},
                "pattern": {"type": "cells", "cells": [[9, 9]]}}"#,
        );
        assert!(matches!(
            AnySimulation::from_config(&config, ManualClock::new()),
            Err(EngineError::Config(ConfigError::CellOutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_parameters_and_render() {
        let config = parse(
            r#"{"width": 5, "height": 1, "rule": {"type": "elementary", "rule": 90},
                "pattern": {"type": "center"}}"#,
        );
        let mut sim = AnySimulation::from_config(&config, ManualClock::new()).unwrap();
        assert_eq!(sim.parameters(), vec![("rule", 90.0)]);
        assert_eq!(sim.render(), "..#..\n");

        sim.set_rule_parameter("rule", 30.0).unwrap();
        assert_eq!(sim.parameters(), vec![("rule", 30.0)]);
    }

    #[test]
    fn test_history_json() {
        let config = parse(
            r#"{"width": 6, "height": 6, "history_len": 3, "rule": {"type": "life"}}"#,
        );
        let mut sim = AnySimulation::from_config(&config, ManualClock::new()).unwrap();
        for _ in 0..5 {
            sim.step_once().unwrap();
        }
        let history = sim.history_json().unwrap();
        let generations: Vec<u64> = history
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["generation"].as_u64().unwrap())
            .collect();
        assert_eq!(generations, vec![3, 4, 5]);
    }
}
