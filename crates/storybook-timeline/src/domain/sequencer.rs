//! The timeline sequencer.

use std::time::Duration;

use storybook_core::stage::Stage;
use tracing::{debug, info};

use super::events::TimelineEvent;
use super::run::{RunHandle, RunStatus, SequenceRun};
use super::step::StepList;
use crate::error::TimelineError;

/// Sequencer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Wait used when a step's duration cannot be resolved and the step
    /// declares no fallback of its own.
    pub default_step_duration: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            default_step_duration: Duration::from_secs(3),
        }
    }
}

/// Executes one step list at a time, driven by host ticks.
#[derive(Debug, Default)]
pub struct TimelineSequencer {
    config: SequencerConfig,
    run: Option<SequenceRun>,
    last_handle: u64,
    events: Vec<TimelineEvent>,
}

impl TimelineSequencer {
    /// Creates a sequencer.
    #[must_use]
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Starts a run and enters its first step immediately.
    ///
    /// Leading zero-length steps are executed in the same call; an empty
    /// step list completes at once.
    ///
    /// # Errors
    ///
    /// Returns `TimelineError::RunInProgress` if the current run is still
    /// running.
    pub fn start(
        &mut self,
        steps: impl Into<StepList>,
        stage: &Stage,
    ) -> Result<RunHandle, TimelineError> {
        if let Some(run) = self.run.as_ref().filter(|r| r.is_running()) {
            return Err(TimelineError::RunInProgress(run.handle()));
        }

        self.last_handle += 1;
        let handle = RunHandle(self.last_handle);
        let run = SequenceRun::new(handle, steps.into());
        info!(run = %handle, steps = run.len(), "timeline run started");
        self.run = Some(run);
        self.advance(Duration::ZERO, stage);
        Ok(handle)
    }

    /// Cancels the run identified by `handle` if it is still running.
    ///
    /// Returns `true` if a run was cancelled. Stale or finished handles are
    /// ignored.
    pub fn cancel(&mut self, handle: RunHandle) -> bool {
        match self.run.as_mut() {
            Some(run) if run.handle() == handle && run.is_running() => {
                run.cancel();
                info!(run = %handle, at_step = run.cursor(), "timeline run cancelled");
                self.events.push(TimelineEvent::RunCancelled {
                    handle,
                    at_step: run.cursor(),
                });
                true
            }
            _ => {
                debug!(run = %handle, "cancel ignored, run is not active");
                false
            }
        }
    }

    /// Cancels whatever run is active, returning its handle.
    pub fn cancel_active(&mut self) -> Option<RunHandle> {
        let handle = self.active_handle()?;
        self.cancel(handle).then_some(handle)
    }

    /// Advances the active run by `delta`.
    pub fn tick(&mut self, delta: Duration, stage: &Stage) {
        self.advance(delta, stage);
    }

    /// Returns the status of the current (or most recent) run.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.run.as_ref().map_or(RunStatus::Idle, SequenceRun::status)
    }

    /// Returns the handle of the running run, if any.
    #[must_use]
    pub fn active_handle(&self) -> Option<RunHandle> {
        self.run
            .as_ref()
            .filter(|r| r.is_running())
            .map(SequenceRun::handle)
    }

    /// Returns `true` while a run is executing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active_handle().is_some()
    }

    /// Returns the current (or most recent) run.
    #[must_use]
    pub fn run(&self) -> Option<&SequenceRun> {
        self.run.as_ref()
    }

    /// Removes and returns the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }

    fn advance(&mut self, delta: Duration, stage: &Stage) {
        let default_duration = self.config.default_step_duration;
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if !run.is_running() {
            return;
        }

        let mut budget = delta;
        loop {
            if run.is_past_end() {
                run.complete();
                info!(run = %run.handle(), "timeline run completed");
                self.events.push(TimelineEvent::RunCompleted {
                    handle: run.handle(),
                });
                return;
            }

            if !run.is_entered() {
                let kind = run.enter_step(stage, default_duration);
                debug!(run = %run.handle(), step = run.cursor(), ?kind, "step entered");
                self.events.push(TimelineEvent::StepEntered {
                    handle: run.handle(),
                    index: run.cursor(),
                    kind,
                });
            }

            match run.spend(budget, stage) {
                Some(leftover) => {
                    run.exit_step(stage);
                    budget = leftover;
                }
                None => return,
            }
        }
    }
}
