//! Sequence runs: the cursor state machine behind a timeline.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storybook_core::stage::Stage;
use tracing::{debug, warn};

use super::step::{Narration, Reveal, StepKind, StepList, TimelineStep};
use super::typewriter::Typewriter;

/// Identifies one run of a sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunHandle(pub u64);

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No run has been started.
    Idle,
    /// Steps are being executed.
    Running,
    /// The run was cancelled; no further step will be entered.
    Cancelled,
    /// Every step finished.
    Completed,
}

/// One execution of a step list.
#[derive(Debug)]
pub struct SequenceRun {
    handle: RunHandle,
    steps: StepList,
    cursor: usize,
    status: RunStatus,
    entered: bool,
    step_elapsed: Duration,
    step_duration: Duration,
    showing_text: bool,
    typewriter: Option<Typewriter>,
}

impl SequenceRun {
    pub(crate) fn new(handle: RunHandle, steps: StepList) -> Self {
        Self {
            handle,
            steps,
            cursor: 0,
            status: RunStatus::Running,
            entered: false,
            step_elapsed: Duration::ZERO,
            step_duration: Duration::ZERO,
            showing_text: false,
            typewriter: None,
        }
    }

    /// Returns the run's handle.
    #[must_use]
    pub fn handle(&self) -> RunHandle {
        self.handle
    }

    /// Returns the index of the current step.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the run's status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the run has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the time remaining in the current step.
    #[must_use]
    pub fn remaining_in_step(&self) -> Duration {
        self.step_duration.saturating_sub(self.step_elapsed)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub(crate) fn is_entered(&self) -> bool {
        self.entered
    }

    pub(crate) fn is_past_end(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub(crate) fn complete(&mut self) {
        self.status = RunStatus::Completed;
    }

    pub(crate) fn cancel(&mut self) {
        self.status = RunStatus::Cancelled;
        self.typewriter = None;
    }

    /// Issues the current step's side effects and resolves its duration.
    pub(crate) fn enter_step(&mut self, stage: &Stage, default_duration: Duration) -> StepKind {
        let index = self.cursor;
        let steps = Arc::clone(&self.steps);
        let step = &steps[index];
        self.entered = true;
        self.step_elapsed = Duration::ZERO;
        self.showing_text = false;
        self.typewriter = None;

        self.step_duration = match step {
            TimelineStep::Narrate(narration) => {
                self.enter_narration(narration, stage);
                let resolved = narration.duration.resolve(stage, default_duration);
                if resolved.fell_back {
                    warn!(
                        run = %self.handle,
                        step = index,
                        source = ?narration.duration,
                        fallback_secs = resolved.duration.as_secs_f64(),
                        "narration duration unavailable, using fallback"
                    );
                }
                resolved.duration
            }
            TimelineStep::Animate {
                cue,
                audio,
                stop_audio,
            } => {
                match stage.audio() {
                    Some(player) => {
                        if let Some(clip) = stop_audio {
                            player.stop(clip);
                        }
                        if let Some(audio) = audio {
                            player.play(&audio.clip, audio.playback);
                        }
                    }
                    None if audio.is_some() || stop_audio.is_some() => {
                        debug!(run = %self.handle, step = index, "no audio player bound, skipping clip");
                    }
                    None => {}
                }
                match stage.animation() {
                    Some(driver) => driver.trigger(cue),
                    None => {
                        debug!(run = %self.handle, step = index, %cue, "no animation driver bound, skipping cue");
                    }
                }
                Duration::ZERO
            }
            TimelineStep::Wait { duration } => {
                let resolved = duration.resolve(stage, default_duration);
                if resolved.fell_back {
                    warn!(
                        run = %self.handle,
                        step = index,
                        source = ?duration,
                        fallback_secs = resolved.duration.as_secs_f64(),
                        "wait duration unavailable, using fallback"
                    );
                }
                resolved.duration
            }
        };

        step.kind()
    }

    fn enter_narration(&mut self, narration: &Narration, stage: &Stage) {
        if let Some(text) = &narration.text {
            match stage.subtitles() {
                Some(panel) => {
                    match narration.reveal {
                        Reveal::Instant => panel.display(Some(text), true),
                        Reveal::Typewriter { per_char } => {
                            let mut typewriter = Typewriter::new(text, per_char);
                            typewriter.advance(Duration::ZERO);
                            panel.display(Some(typewriter.visible_text()), true);
                            self.typewriter = Some(typewriter);
                        }
                    }
                    self.showing_text = narration.hide_after;
                }
                None => debug!(run = %self.handle, step = self.cursor, "no subtitle panel bound, skipping text"),
            }
        }

        if let Some(audio) = &narration.audio {
            match stage.audio() {
                Some(player) => player.play(&audio.clip, audio.playback),
                None => debug!(run = %self.handle, step = self.cursor, clip = %audio.clip, "no audio player bound, skipping clip"),
            }
        }

        if let Some(cue) = &narration.cue {
            match stage.animation() {
                Some(driver) => driver.trigger(cue),
                None => debug!(run = %self.handle, step = self.cursor, %cue, "no animation driver bound, skipping cue"),
            }
        }
    }

    /// Spends up to `budget` in the current step and returns what is left
    /// over once the step has finished, or `None` if it is still waiting.
    pub(crate) fn spend(&mut self, budget: Duration, stage: &Stage) -> Option<Duration> {
        let remaining = self.remaining_in_step();
        let (used, leftover) = if budget >= remaining {
            (remaining, Some(budget - remaining))
        } else {
            (budget, None)
        };

        self.step_elapsed += used;
        if let Some(typewriter) = self.typewriter.as_mut() {
            if typewriter.advance(used) {
                if let Some(panel) = stage.subtitles() {
                    panel.display(Some(typewriter.visible_text()), true);
                }
            }
        }
        leftover
    }

    /// Runs the current step's exit effects and moves the cursor forward.
    pub(crate) fn exit_step(&mut self, stage: &Stage) {
        if self.showing_text {
            if let Some(panel) = stage.subtitles() {
                panel.display(None, false);
            }
        }
        self.showing_text = false;
        self.typewriter = None;
        self.entered = false;
        self.step_elapsed = Duration::ZERO;
        self.step_duration = Duration::ZERO;
        self.cursor += 1;
    }
}
