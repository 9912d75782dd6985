//! Simulation loop - play/pause/step state machine over a stepper.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::{Clock, Command, EngineError, PreconditionError, TickScheduler};
use crate::compute::{
    CellState, Grid, Rule, StatisticsSnapshot, StatsHistory, Stepper, summarize,
};
use crate::schema::{Boundary, ConfigError, LateTicks, Pattern, SimulationConfig};

/// Loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Initial state; edits and manual steps are allowed.
    Paused,
    /// Steps fire on the scheduler's interval.
    Running,
    /// A step is being computed.
    Stepping,
    /// Torn down; every command is rejected.
    Terminated,
}

/// Immutable view of the loop handed to readers.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    pub grid: Arc<Grid<S>>,
    pub generation: u64,
    pub running: bool,
}

impl<S: CellState> Snapshot<S> {
    pub fn statistics(&self) -> StatisticsSnapshot<S::Stats> {
        summarize(&self.grid, self.generation)
    }
}

/// Receives errors raised by scheduled ticks, which have no caller to
/// return them to.
pub type ErrorSink = Box<dyn FnMut(&EngineError)>;

/// Called with a snapshot after every completed step.
pub type StepObserver<S> = Box<dyn FnMut(&Snapshot<S>)>;

/// Loop settings independent of the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    pub interval_ms: u64,
    pub seed: u64,
    pub late_ticks: LateTicks,
    pub history_len: usize,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            seed: 0,
            late_ticks: LateTicks::Coalesce,
            history_len: 0,
        }
    }
}

impl LoopOptions {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            interval_ms: config.interval_ms,
            seed: config.seed,
            late_ticks: config.late_ticks,
            history_len: config.history_len,
        }
    }
}

/// Owns the current grid, the stepper and the running flag.
///
/// Time comes from the injected [`Clock`]; the loop fires due ticks when
/// [`poll`](Self::poll)ed, so scheduling is cooperative and single-threaded.
/// Structural edits (resize, randomize, toggle, clear, pattern, boundary)
/// are only accepted while paused.
pub struct SimulationLoop<R: Rule, C: Clock> {
    grid: Arc<Grid<R::State>>,
    stepper: Stepper<R>,
    state: LoopState,
    scheduler: TickScheduler,
    clock: C,
    history: StatsHistory<<R::State as CellState>::Stats>,
    error_sink: Option<ErrorSink>,
    observers: Vec<StepObserver<R::State>>,
}

impl<R: Rule, C: Clock> SimulationLoop<R, C> {
    /// Create a paused loop at generation 0.
    pub fn new(
        grid: Grid<R::State>,
        rule: R,
        options: LoopOptions,
        clock: C,
    ) -> Result<Self, ConfigError> {
        if options.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        let stepper = Stepper::new(rule, options.seed)?;
        stepper.check(&grid)?;

        let mut sim = Self {
            grid: Arc::new(grid),
            stepper,
            state: LoopState::Paused,
            scheduler: TickScheduler::new(
                Duration::from_millis(options.interval_ms),
                options.late_ticks,
            ),
            clock,
            history: StatsHistory::new(options.history_len),
            error_sink: None,
            observers: Vec::new(),
        };
        sim.record_statistics();
        Ok(sim)
    }

    /// Route errors from scheduled ticks to `sink`.
    pub fn with_error_sink(mut self, sink: ErrorSink) -> Self {
        self.error_sink = Some(sink);
        self
    }

    pub fn set_error_sink(&mut self, sink: ErrorSink) {
        self.error_sink = Some(sink);
    }

    pub fn add_step_observer(&mut self, observer: StepObserver<R::State>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn generation(&self) -> u64 {
        self.stepper.generation()
    }

    pub fn interval(&self) -> Duration {
        self.scheduler.interval()
    }

    /// Ticks dropped by the late-tick policy so far.
    pub fn dropped_ticks(&self) -> u64 {
        self.scheduler.dropped_ticks()
    }

    pub fn rule(&self) -> &R {
        self.stepper.rule()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current grid. Never mutated after being handed out.
    pub fn grid(&self) -> Arc<Grid<R::State>> {
        Arc::clone(&self.grid)
    }

    pub fn snapshot(&self) -> Snapshot<R::State> {
        Snapshot {
            grid: self.grid(),
            generation: self.generation(),
            running: self.is_running(),
        }
    }

    pub fn statistics(&self) -> StatisticsSnapshot<<R::State as CellState>::Stats> {
        summarize(&self.grid, self.generation())
    }

    pub fn history(&self) -> &StatsHistory<<R::State as CellState>::Stats> {
        &self.history
    }

    /// Start automatic stepping. Playing while running is a no-op.
    pub fn play(&mut self) -> Result<(), EngineError> {
        match self.state {
            LoopState::Terminated => Err(PreconditionError::Terminated.into()),
            LoopState::Stepping => Err(PreconditionError::StepInFlight.into()),
            LoopState::Running => Ok(()),
            LoopState::Paused => {
                self.state = LoopState::Running;
                self.scheduler.arm(self.clock.now());
                log::info!(
                    "Playing at generation {} every {:?}",
                    self.generation(),
                    self.scheduler.interval()
                );
                Ok(())
            }
        }
    }

    /// Stop automatic stepping and cancel the pending tick. Pausing while
    /// paused is a no-op.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        match self.state {
            LoopState::Terminated => Err(PreconditionError::Terminated.into()),
            LoopState::Stepping => Err(PreconditionError::StepInFlight.into()),
            LoopState::Paused => Ok(()),
            LoopState::Running => {
                self.state = LoopState::Paused;
                self.scheduler.cancel();
                log::info!("Paused at generation {}", self.generation());
                Ok(())
            }
        }
    }

    /// Apply exactly one step. Only valid while paused.
    pub fn step_once(&mut self) -> Result<(), EngineError> {
        self.ensure_paused(Command::StepOnce)?;
        self.advance()
    }

    /// Fire every tick due at the clock's current time. Returns the number
    /// of steps taken.
    ///
    /// A failing tick pauses the loop and is reported to the error sink.
    pub fn poll(&mut self) -> u64 {
        match self.fire_due(u64::MAX) {
            Ok(fired) => fired,
            Err((fired, err)) => {
                log::warn!("Scheduled step failed, pausing: {err}");
                self.halt();
                if let Some(sink) = self.error_sink.as_mut() {
                    sink(&err);
                }
                fired
            }
        }
    }

    /// Play until `ticks` more generations have run, sleeping on the clock
    /// between deadlines, then pause. Returns the generations advanced.
    pub fn run_ticks(&mut self, ticks: u64) -> Result<u64, EngineError> {
        let start = self.generation();
        self.play()?;

        while self.generation() - start < ticks && self.is_running() {
            if let Some(wait) = self.scheduler.time_until_next(self.clock.now()) {
                if !wait.is_zero() {
                    self.clock.sleep(wait);
                }
            }
            let remaining = ticks - (self.generation() - start);
            if let Err((_, err)) = self.fire_due(remaining) {
                self.halt();
                return Err(err);
            }
        }

        self.pause()?;
        Ok(self.generation() - start)
    }

    /// Change the tick interval. Legal in any live state; a pending tick is
    /// rescheduled from now.
    pub fn set_speed(&mut self, interval_ms: u64) -> Result<(), EngineError> {
        self.ensure_live()?;
        if interval_ms == 0 {
            return Err(ConfigError::InvalidInterval.into());
        }
        let now = self.clock.now();
        self.scheduler
            .set_interval(Duration::from_millis(interval_ms), now);
        log::debug!("Interval set to {interval_ms}ms");
        Ok(())
    }

    /// Change a rule parameter; takes effect from the next step.
    pub fn set_rule_parameter(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.stepper.set_parameter(name, value)?;
        log::debug!("Rule parameter {name} = {value}");
        Ok(())
    }

    /// Advance one cell along its editing cycle. Keeps the generation.
    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<(), EngineError> {
        self.ensure_paused(Command::ToggleCell)?;
        let next = self.grid.with_cell_toggled(x, y)?;
        self.grid = Arc::new(next);
        Ok(())
    }

    /// Reallocate the grid, keeping overlapping cells. Resets the generation.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        self.ensure_paused(Command::Resize)?;
        let next = self.grid.resized(width, height)?;
        self.stepper.check(&next)?;
        self.replace_grid(next);
        log::info!("Resized to {width}x{height}");
        Ok(())
    }

    /// Refill every cell at random. Resets the generation.
    pub fn randomize(&mut self, density: f64) -> Result<(), EngineError> {
        self.ensure_paused(Command::Randomize)?;
        let next = self.grid.randomized(density, self.stepper.rng_mut())?;
        self.replace_grid(next);
        Ok(())
    }

    /// Reset every cell to quiescent. Resets the generation.
    pub fn clear(&mut self) -> Result<(), EngineError> {
        self.ensure_paused(Command::Clear)?;
        let next = self.grid.cleared();
        self.replace_grid(next);
        Ok(())
    }

    /// Replace the grid with a seed pattern. Resets the generation.
    pub fn load_pattern(&mut self, pattern: &Pattern) -> Result<(), EngineError> {
        self.ensure_paused(Command::LoadPattern)?;
        let next = pattern.generate(self.grid.cleared(), self.stepper.rng_mut())?;
        self.replace_grid(next);
        Ok(())
    }

    /// Switch the boundary policy, keeping cells and generation.
    pub fn set_boundary(&mut self, boundary: Boundary) -> Result<(), EngineError> {
        self.ensure_paused(Command::SetBoundary)?;
        self.grid = Arc::new(self.grid.with_boundary(boundary));
        Ok(())
    }

    /// Stop for good. Any pending tick is cancelled; later polls do nothing
    /// and later commands fail with [`PreconditionError::Terminated`].
    pub fn teardown(&mut self) {
        if self.state == LoopState::Terminated {
            return;
        }
        self.scheduler.cancel();
        self.state = LoopState::Terminated;
        self.observers.clear();
        log::info!("Torn down at generation {}", self.generation());
    }

    /// Fire up to `limit` due ticks. On error returns the steps already
    /// taken with the error.
    fn fire_due(&mut self, limit: u64) -> Result<u64, (u64, EngineError)> {
        if self.state != LoopState::Running {
            return Ok(0);
        }
        let due = u64::from(self.scheduler.take_due(self.clock.now())).min(limit);
        let mut fired = 0;
        while fired < due && self.state == LoopState::Running {
            self.advance().map_err(|e| (fired, e))?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Compute one step and publish it. The grid is only replaced once the
    /// whole next generation exists.
    fn advance(&mut self) -> Result<(), EngineError> {
        let resume = match self.state {
            LoopState::Stepping => return Err(PreconditionError::StepInFlight.into()),
            LoopState::Terminated => return Err(PreconditionError::Terminated.into()),
            state => state,
        };

        self.state = LoopState::Stepping;
        let result = self.stepper.step(&self.grid);
        self.state = resume;

        self.grid = Arc::new(result?);
        self.record_statistics();
        log::debug!("Generation {}", self.generation());

        if !self.observers.is_empty() {
            let snapshot = self.snapshot();
            for observer in &mut self.observers {
                observer(&snapshot);
            }
        }
        Ok(())
    }

    fn replace_grid(&mut self, grid: Grid<R::State>) {
        self.grid = Arc::new(grid);
        self.stepper.reset_generation();
        self.history.clear();
        self.record_statistics();
    }

    fn record_statistics(&mut self) {
        if self.history.capacity() > 0 {
            let stats = self.statistics();
            self.history.push(stats);
        }
    }

    fn halt(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Paused;
        }
        self.scheduler.cancel();
    }

    fn ensure_live(&self) -> Result<(), PreconditionError> {
        match self.state {
            LoopState::Terminated => Err(PreconditionError::Terminated),
            LoopState::Stepping => Err(PreconditionError::StepInFlight),
            LoopState::Paused | LoopState::Running => Ok(()),
        }
    }

    fn ensure_paused(&self, command: Command) -> Result<(), PreconditionError> {
        match self.state {
            LoopState::Paused => Ok(()),
            LoopState::Running => Err(PreconditionError::Running(command)),
            LoopState::Stepping => Err(PreconditionError::StepInFlight),
            LoopState::Terminated => Err(PreconditionError::Terminated),
        }
    }
}

impl<R: Rule, C: Clock> Drop for SimulationLoop<R, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
