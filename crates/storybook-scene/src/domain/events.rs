//! Scene events.

use serde::{Deserialize, Serialize};
use storybook_core::event::{DomainEvent, EventMetadata};
use storybook_timeline::{RunHandle, StepKind};

/// Event payload variants for a page scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneEventKind {
    /// The target was found and a new episode began.
    Activated {
        /// The recognized target.
        target_id: String,
    },
    /// The intro timeline started.
    IntroStarted {
        /// The intro run.
        run: RunHandle,
    },
    /// An intro start was requested while a run was still playing.
    IntroIgnored {
        /// The run that kept playing.
        active_run: RunHandle,
    },
    /// A timeline step was entered.
    StepEntered {
        /// The run the step belongs to.
        run: RunHandle,
        /// Zero-based step index.
        index: usize,
        /// The step's kind.
        kind: StepKind,
    },
    /// The intro finished.
    IntroCompleted {
        /// The intro run.
        run: RunHandle,
        /// `true` if gameplay follows.
        interactive: bool,
    },
    /// Collection goals were configured and the idle watchdog armed.
    GameplayStarted {
        /// Number of goal categories.
        categories: usize,
        /// Idle threshold in seconds.
        idle_threshold_secs: f64,
    },
    /// An interaction counted towards a goal.
    CollectionAccepted {
        /// Normalized category name.
        category: String,
        /// The collected item.
        item_id: String,
        /// The category's progress.
        fraction: f32,
        /// Overall progress.
        overall: f32,
    },
    /// An interaction was rejected (unknown or full category, or an item
    /// collected before).
    CollectionRejected {
        /// The category as reported.
        category: String,
        /// The reported item.
        item_id: String,
    },
    /// The player was idle past the threshold.
    IdleNudged,
    /// Every goal was met.
    GoalsCompleted,
    /// The win timeline started.
    WinStarted {
        /// The win run.
        run: RunHandle,
    },
    /// The win timeline finished.
    WinCompleted {
        /// The win run.
        run: RunHandle,
    },
    /// The target was lost and the scene reset.
    Deactivated {
        /// The run that was cut short, if any.
        cancelled_run: Option<RunHandle>,
    },
}

impl SceneEventKind {
    /// Returns the routing name of this event kind.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Activated { .. } => "scene.activated",
            Self::IntroStarted { .. } => "scene.intro_started",
            Self::IntroIgnored { .. } => "scene.intro_ignored",
            Self::StepEntered { .. } => "scene.step_entered",
            Self::IntroCompleted { .. } => "scene.intro_completed",
            Self::GameplayStarted { .. } => "scene.gameplay_started",
            Self::CollectionAccepted { .. } => "scene.collection_accepted",
            Self::CollectionRejected { .. } => "scene.collection_rejected",
            Self::IdleNudged => "scene.idle_nudged",
            Self::GoalsCompleted => "scene.goals_completed",
            Self::WinStarted { .. } => "scene.win_started",
            Self::WinCompleted { .. } => "scene.win_completed",
            Self::Deactivated { .. } => "scene.deactivated",
        }
    }
}

/// Scene event envelope.
#[derive(Debug, Clone)]
pub struct SceneEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SceneEventKind,
}

impl DomainEvent for SceneEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SceneEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
