//! Runtime error types.

use std::fmt;

use crate::schema::ConfigError;

/// Commands that require the loop to be paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StepOnce,
    Resize,
    Randomize,
    ToggleCell,
    Clear,
    LoadPattern,
    SetBoundary,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::StepOnce => "step",
            Command::Resize => "resize",
            Command::Randomize => "randomize",
            Command::ToggleCell => "toggle a cell",
            Command::Clear => "clear",
            Command::LoadPattern => "load a pattern",
            Command::SetBoundary => "change the boundary",
        };
        f.write_str(name)
    }
}

/// Command issued in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("Cannot {0} while the simulation is running")]
    Running(Command),
    #[error("A step is already in flight")]
    StepInFlight,
    #[error("The simulation has been torn down")]
    Terminated,
}

/// Any error surfaced by a simulation loop command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}
