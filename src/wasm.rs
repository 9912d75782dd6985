//! WebAssembly bindings for Grid Automata.
//!
//! Provides a thin wrapper around [`AnySimulation`] for browser environments.
//! The browser owns the frame loop: call `tick` from `requestAnimationFrame`
//! with the frame timestamp and the simulation fires whatever steps are due.

use wasm_bindgen::prelude::*;

use crate::{
    runtime::{AnySimulation, EngineError, ManualClock},
    schema::{Boundary, Pattern, SimulationConfig},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(e: EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WebAssembly wrapper for a grid automaton simulation.
#[wasm_bindgen]
pub struct WasmSimulation {
    sim: AnySimulation<ManualClock>,
    clock: ManualClock,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Create a paused simulation from JSON configuration.
    ///
    /// # Arguments
    /// * `config_json` - JSON string containing SimulationConfig
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmSimulation, JsValue> {
        let config: SimulationConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;

        let clock = ManualClock::new();
        let sim = AnySimulation::from_config(&config, clock.clone()).map_err(js_error)?;

        Ok(WasmSimulation { sim, clock })
    }

    /// Start automatic stepping from timestamp `now_ms`.
    #[wasm_bindgen]
    pub fn play(&mut self, now_ms: f64) -> Result<(), JsValue> {
        if !self.clock.set_millis(now_ms) {
            return Err(JsValue::from_str(&format!("Invalid timestamp: {now_ms}")));
        }
        self.sim.play().map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) -> Result<(), JsValue> {
        self.sim.pause().map_err(js_error)
    }

    /// Advance exactly one generation. Only valid while paused.
    #[wasm_bindgen(js_name = stepOnce)]
    pub fn step_once(&mut self) -> Result<(), JsValue> {
        self.sim.step_once().map_err(js_error)
    }

    /// Fire the steps due at timestamp `now_ms`. Returns how many ran.
    ///
    /// Invalid timestamps are ignored.
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        if !self.clock.set_millis(now_ms) {
            log::warn!("Ignoring invalid timestamp {now_ms}");
            return 0;
        }
        u32::try_from(self.sim.poll()).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), JsValue> {
        self.sim.resize(width, height).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn randomize(&mut self, density: f64) -> Result<(), JsValue> {
        self.sim.randomize(density).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) -> Result<(), JsValue> {
        self.sim.clear().map_err(js_error)
    }

    #[wasm_bindgen(js_name = toggleCell)]
    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<(), JsValue> {
        self.sim.toggle_cell(x, y).map_err(js_error)
    }

    /// Replace the grid with a pattern given as JSON.
    #[wasm_bindgen(js_name = loadPattern)]
    pub fn load_pattern(&mut self, pattern_json: &str) -> Result<(), JsValue> {
        let pattern: Pattern = serde_json::from_str(pattern_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid pattern JSON: {e}")))?;
        self.sim.load_pattern(&pattern).map_err(js_error)
    }

    /// Switch between `"finite"` and `"toroidal"` edges.
    #[wasm_bindgen(js_name = setBoundary)]
    pub fn set_boundary(&mut self, boundary: &str) -> Result<(), JsValue> {
        let boundary = match boundary {
            "finite" => Boundary::Finite,
            "toroidal" => Boundary::Toroidal,
            other => return Err(JsValue::from_str(&format!("Unknown boundary: {other}"))),
        };
        self.sim.set_boundary(boundary).map_err(js_error)
    }

    /// Change the step interval. Takes effect immediately while running.
    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, interval_ms: u32) -> Result<(), JsValue> {
        self.sim.set_speed(u64::from(interval_ms)).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setRuleParameter)]
    pub fn set_rule_parameter(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.sim.set_rule_parameter(name, value).map_err(js_error)
    }

    /// Receive errors from scheduled steps as strings.
    #[wasm_bindgen(js_name = setErrorCallback)]
    pub fn set_error_callback(&mut self, callback: js_sys::Function) {
        self.sim.set_error_sink(Box::new(move |e| {
            let message = JsValue::from_str(&e.to_string());
            if let Err(err) = callback.call1(&JsValue::NULL, &message) {
                log::error!("Error callback threw: {err:?}");
            }
        }));
    }

    /// Current grid as `{width, height, generation, running, levels}`.
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sim.view())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Cell levels only, row-major, as a `Float32Array`.
    #[wasm_bindgen(js_name = getLevels)]
    pub fn get_levels(&self) -> Vec<f32> {
        self.sim.view().levels
    }

    #[wasm_bindgen(js_name = getStatistics)]
    pub fn get_statistics(&self) -> Result<JsValue, JsValue> {
        let stats = self
            .sim
            .statistics_json()
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))?;
        serde_wasm_bindgen::to_value(&stats)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    #[wasm_bindgen(js_name = getHistory)]
    pub fn get_history(&self) -> Result<JsValue, JsValue> {
        let history = self
            .sim
            .history_json()
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))?;
        serde_wasm_bindgen::to_value(&history)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Rule parameters as `{name: value}`.
    #[wasm_bindgen(js_name = getParameters)]
    pub fn get_parameters(&self) -> Result<JsValue, JsValue> {
        let params: std::collections::BTreeMap<&str, f64> =
            self.sim.parameters().into_iter().collect();
        serde_wasm_bindgen::to_value(&params)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    #[wasm_bindgen(js_name = getRuleName)]
    pub fn get_rule_name(&self) -> String {
        self.sim.rule_name().to_string()
    }

    #[wasm_bindgen(js_name = getGeneration)]
    pub fn get_generation(&self) -> u64 {
        self.sim.generation()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.sim.is_running()
    }

    #[wasm_bindgen(js_name = getWidth)]
    pub fn get_width(&self) -> usize {
        self.sim.width()
    }

    #[wasm_bindgen(js_name = getHeight)]
    pub fn get_height(&self) -> usize {
        self.sim.height()
    }

    /// Stop for good. Later ticks do nothing.
    #[wasm_bindgen]
    pub fn teardown(&mut self) {
        self.sim.teardown();
    }
}
