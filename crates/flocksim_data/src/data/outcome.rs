use serde::{Deserialize, Serialize};

/// Lifecycle of one simulation instance. The transition is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunState {
    #[default]
    Running,
    /// Every prey has been eaten.
    Terminal,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TickResult {
    /// Prey that went from alive to eaten during this tick.
    pub eaten: usize,
    pub all_eaten: bool,
}

/// Outcome of a manual kill outside the normal tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KillReport {
    pub killed: usize,
    pub remaining: usize,
    pub all_eaten: bool,
}
