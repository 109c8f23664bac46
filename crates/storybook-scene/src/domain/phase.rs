use serde::{Deserialize, Serialize};

/// Where a page is in its recognition episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenePhase {
    /// The target is not recognized; nothing runs.
    #[default]
    Dormant,
    /// The intro timeline is playing.
    Intro,
    /// The intro finished on a page without collection goals.
    Passive,
    /// The player is collecting; the idle watchdog may be counting.
    Gameplay,
    /// Every goal is met and the win timeline is playing.
    Finale,
    /// The win timeline finished.
    Finished,
}

impl ScenePhase {
    /// Returns `true` for every phase except `Dormant`.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Dormant)
    }
}
