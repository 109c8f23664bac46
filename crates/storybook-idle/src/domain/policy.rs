use serde::{Deserialize, Serialize};

/// What an accepted interaction does to an armed watchdog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdlePolicy {
    /// The first interaction disarms the watchdog for the rest of the cycle.
    #[default]
    DisarmOnInteraction,
    /// Each interaction restarts the countdown; a later idle spell can
    /// still fire.
    RestartOnInteraction,
}
