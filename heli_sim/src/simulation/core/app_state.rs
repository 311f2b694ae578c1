// heli_sim/src/simulation/core/app_state.rs

use std::fmt;

/// Why a test scenario stopped.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EndTrigger {
    /// The autopilot reached the final waypoint.
    ReachedDestination,
    /// The user pressed the skip key.
    UserSkipped,
    /// The scenario ran longer than its timeout.
    TimedOut,
    /// Terrain collision, too low above ground, or a non-finite control output.
    Crashed,
}

impl fmt::Display for EndTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Defines the phases of a batch test run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum RunnerState {
    /// The current scenario is being flown. The runner starts here.
    #[default]
    RunningScenario,

    /// A scenario ended on this tick. The following scenario or velocity is
    /// already set up and starts flying on the next tick.
    ScenarioEnded(EndTrigger),

    /// Every scenario has been flown and the results are written.
    AllScenariosComplete,
}

impl RunnerState {
    pub fn is_complete(self) -> bool {
        self == RunnerState::AllScenariosComplete
    }
}
