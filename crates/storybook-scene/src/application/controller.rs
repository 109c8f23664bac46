//! The per-page scene controller.
//!
//! Owns one gate, one sequencer, one accumulator and one watchdog and is the
//! only thing that mutates them. Component events are drained after each
//! call into a component returns, so no handler runs while a component is
//! mid-update.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use storybook_core::clock::Clock;
use storybook_core::event::EventMetadata;
use storybook_core::outbox::EventOutbox;
use storybook_core::signal::{InteractionSignal, RecognitionEvent};
use storybook_core::stage::{FeedbackKind, Playback, Stage};
use storybook_idle::{IdleWatchdog, WatchdogState};
use storybook_progress::{ProgressAccumulator, ProgressEvent};
use storybook_recognition::{GateTransition, RecognitionGate};
use storybook_timeline::{RunHandle, TimelineError, TimelineEvent, TimelineSequencer};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::config::PageConfig;
use crate::domain::events::{SceneEvent, SceneEventKind};
use crate::domain::phase::ScenePhase;

/// Receives every scene event as it is recorded.
pub trait SceneObserver: Send + Sync {
    /// Called once per event, in recording order.
    fn on_scene_event(&self, event: &SceneEvent);
}

/// Drives one page through its recognition episodes.
pub struct SceneController {
    page: PageConfig,
    stage: Stage,
    clock: Arc<dyn Clock>,
    gate: RecognitionGate,
    sequencer: TimelineSequencer,
    progress: ProgressAccumulator,
    watchdog: IdleWatchdog,
    phase: ScenePhase,
    episode_id: Uuid,
    intro_run: Option<RunHandle>,
    win_run: Option<RunHandle>,
    hint_playing: bool,
    sequence_number: i64,
    pending_events: Vec<SceneEvent>,
    observers: Vec<Arc<dyn SceneObserver>>,
}

impl fmt::Debug for SceneController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneController")
            .field("target_id", &self.page.target_id)
            .field("phase", &self.phase)
            .field("episode_id", &self.episode_id)
            .field("sequencer", &self.sequencer)
            .field("progress", &self.progress)
            .field("watchdog", &self.watchdog)
            .finish_non_exhaustive()
    }
}

impl SceneController {
    /// Creates a dormant controller for `page`.
    #[must_use]
    pub fn new(page: PageConfig, stage: Stage, clock: Arc<dyn Clock>) -> Self {
        let gate = RecognitionGate::new(page.target_id.clone())
            .with_limited_tracking(page.accept_limited_tracking);
        let sequencer = TimelineSequencer::new(page.sequencer);
        let watchdog = IdleWatchdog::new(page.idle.policy);
        Self {
            page,
            stage,
            clock,
            gate,
            sequencer,
            progress: ProgressAccumulator::new(),
            watchdog,
            phase: ScenePhase::Dormant,
            episode_id: Uuid::nil(),
            intro_run: None,
            win_run: None,
            hint_playing: false,
            sequence_number: 0,
            pending_events: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Registers an observer for every subsequent event.
    pub fn subscribe(&mut self, observer: Arc<dyn SceneObserver>) {
        self.observers.push(observer);
    }

    /// Feeds a tracker status change through the page's gate.
    #[instrument(skip(self, event), fields(target_id = %self.page.target_id, state = ?event.state))]
    pub fn on_recognition(&mut self, event: &RecognitionEvent) {
        match self.gate.observe(event) {
            Some(GateTransition::FoundOnce) => self.activate(),
            Some(GateTransition::Lost) => self.deactivate(),
            None => {}
        }
    }

    /// Reports a player interaction. Returns `true` if it counted towards a
    /// goal.
    #[instrument(skip(self, signal), fields(target_id = %self.page.target_id, category = %signal.category))]
    pub fn on_interaction(&mut self, signal: &InteractionSignal) -> bool {
        if self.phase != ScenePhase::Gameplay {
            debug!(phase = ?self.phase, "interaction ignored outside gameplay");
            return false;
        }

        if !self
            .progress
            .try_accept_item(&signal.category, &signal.item_id)
        {
            self.record(SceneEventKind::CollectionRejected {
                category: signal.category.clone(),
                item_id: signal.item_id.clone(),
            });
            return false;
        }

        for event in self.progress.drain_events() {
            match event {
                ProgressEvent::Accepted {
                    category,
                    fraction,
                    overall,
                } => {
                    if let Some(display) = self.stage.progress() {
                        display.update_category(&category, fraction);
                        display.update_overall(overall);
                    }
                    self.watchdog.notify_interaction();
                    self.stop_hint();
                    self.record(SceneEventKind::CollectionAccepted {
                        category,
                        item_id: signal.item_id.clone(),
                        fraction,
                        overall,
                    });
                }
                ProgressEvent::Completed => self.on_goals_completed(),
            }
        }
        true
    }

    /// Advances the active timeline, then the idle watchdog.
    ///
    /// A watchdog armed during this tick's timeline update starts counting
    /// from the next tick.
    pub fn tick(&mut self, delta: Duration) {
        if !self.phase.is_active() {
            return;
        }
        let counting = self.watchdog.state() == WatchdogState::Armed;
        self.sequencer.tick(delta, &self.stage);
        self.drain_timeline();
        if counting && self.watchdog.tick(delta) {
            self.on_idle_timeout();
        }
    }

    /// Starts the intro timeline from its first step.
    ///
    /// Ignored (and logged) while the target is not recognized or while a
    /// timeline is still running. Returns the new run's handle.
    pub fn start_intro(&mut self) -> Option<RunHandle> {
        if !self.gate.is_found() {
            debug!(target_id = %self.page.target_id, "intro start ignored, target not recognized");
            return None;
        }

        match self.sequencer.start(Arc::clone(&self.page.intro), &self.stage) {
            Ok(run) => {
                self.watchdog.disarm();
                self.intro_run = Some(run);
                self.win_run = None;
                self.phase = ScenePhase::Intro;
                self.record(SceneEventKind::IntroStarted { run });
                self.drain_timeline();
                Some(run)
            }
            Err(TimelineError::RunInProgress(active_run)) => {
                warn!(
                    target_id = %self.page.target_id,
                    active_run = %active_run,
                    "intro start ignored, a timeline is already running"
                );
                self.record(SceneEventKind::IntroIgnored { active_run });
                None
            }
        }
    }

    /// Returns the page's target id.
    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.page.target_id
    }

    /// Returns the page definition.
    #[must_use]
    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    #[must_use]
    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    /// Returns the current episode id (nil before the first activation).
    #[must_use]
    pub fn episode_id(&self) -> Uuid {
        self.episode_id
    }

    #[must_use]
    pub fn sequencer(&self) -> &TimelineSequencer {
        &self.sequencer
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressAccumulator {
        &self.progress
    }

    #[must_use]
    pub fn watchdog(&self) -> &IdleWatchdog {
        &self.watchdog
    }

    fn activate(&mut self) {
        self.episode_id = Uuid::new_v4();
        self.progress.clear();
        self.watchdog.reset();
        self.intro_run = None;
        self.win_run = None;
        self.hint_playing = false;
        if let Some(content) = self.stage.content() {
            content.set_visible(true);
        }
        if let Some(animation) = self.stage.animation() {
            animation.reset_all();
        }

        info!(target_id = %self.page.target_id, episode_id = %self.episode_id, "scene activated");
        self.record(SceneEventKind::Activated {
            target_id: self.page.target_id.clone(),
        });
        self.start_intro();
    }

    fn deactivate(&mut self) {
        let cancelled_run = self.sequencer.cancel_active();
        self.sequencer.drain_events();
        self.watchdog.disarm();
        self.progress.clear();
        self.intro_run = None;
        self.win_run = None;
        self.hint_playing = false;
        self.phase = ScenePhase::Dormant;
        if let Some(content) = self.stage.content() {
            content.set_visible(false);
        }

        info!(
            target_id = %self.page.target_id,
            episode_id = %self.episode_id,
            cancelled = cancelled_run.is_some(),
            "scene deactivated"
        );
        self.record(SceneEventKind::Deactivated { cancelled_run });
    }

    fn drain_timeline(&mut self) {
        loop {
            let events = self.sequencer.drain_events();
            if events.is_empty() {
                return;
            }
            for event in events {
                self.on_timeline_event(event);
            }
        }
    }

    fn on_timeline_event(&mut self, event: TimelineEvent) {
        match event {
            TimelineEvent::StepEntered {
                handle,
                index,
                kind,
            } => self.record(SceneEventKind::StepEntered {
                run: handle,
                index,
                kind,
            }),
            TimelineEvent::RunCompleted { handle } => {
                if self.intro_run == Some(handle) {
                    self.on_intro_completed(handle);
                } else if self.win_run == Some(handle) {
                    self.phase = ScenePhase::Finished;
                    info!(target_id = %self.page.target_id, "win timeline finished");
                    self.record(SceneEventKind::WinCompleted { run: handle });
                }
            }
            TimelineEvent::RunCancelled { .. } => {}
        }
    }

    fn on_intro_completed(&mut self, run: RunHandle) {
        let Some(goals) = self.page.goals.clone() else {
            self.phase = ScenePhase::Passive;
            info!(target_id = %self.page.target_id, "intro finished, page is passive");
            self.record(SceneEventKind::IntroCompleted {
                run,
                interactive: false,
            });
            return;
        };

        self.record(SceneEventKind::IntroCompleted {
            run,
            interactive: true,
        });
        self.progress.configure(&goals);
        self.watchdog.arm(self.page.idle.threshold);
        self.phase = ScenePhase::Gameplay;
        info!(target_id = %self.page.target_id, categories = goals.len(), "gameplay started");
        self.record(SceneEventKind::GameplayStarted {
            categories: goals.len(),
            idle_threshold_secs: self.page.idle.threshold.as_secs_f64(),
        });

        if let Some(display) = self.stage.progress() {
            for category in self.progress.categories() {
                display.update_category(&category.name, category.fraction());
            }
            display.update_overall(self.progress.overall_fraction());
        }

        if self.progress.drain_events().contains(&ProgressEvent::Completed) {
            self.on_goals_completed();
        }
    }

    fn on_goals_completed(&mut self) {
        self.watchdog.disarm();
        if let Some(display) = self.stage.progress() {
            for category in self.progress.categories() {
                display.update_category(&category.name, 1.0);
            }
            display.update_overall(1.0);
        }
        if let Some(feedback) = self.stage.feedback() {
            feedback.terminal_feedback(FeedbackKind::Win);
        }
        info!(target_id = %self.page.target_id, "all goals met");
        self.record(SceneEventKind::GoalsCompleted);
        self.start_win();
    }

    fn start_win(&mut self) {
        if self.win_run.is_some() {
            debug!(target_id = %self.page.target_id, "win timeline already started");
            return;
        }
        match self.sequencer.start(Arc::clone(&self.page.win), &self.stage) {
            Ok(run) => {
                self.win_run = Some(run);
                self.phase = ScenePhase::Finale;
                self.record(SceneEventKind::WinStarted { run });
                self.drain_timeline();
            }
            Err(TimelineError::RunInProgress(active_run)) => {
                warn!(
                    target_id = %self.page.target_id,
                    active_run = %active_run,
                    "win timeline blocked by a running timeline"
                );
            }
        }
    }

    fn on_idle_timeout(&mut self) {
        if let Some(feedback) = self.stage.feedback() {
            feedback.terminal_feedback(FeedbackKind::IdleHint);
        }
        if let Some(clip) = self.page.idle.hint_clip.as_ref() {
            if let Some(audio) = self.stage.audio() {
                audio.play(clip, Playback::OneShot);
                self.hint_playing = true;
            }
        }
        info!(target_id = %self.page.target_id, "idle nudge");
        self.record(SceneEventKind::IdleNudged);
    }

    fn stop_hint(&mut self) {
        if !self.hint_playing || !self.page.idle.stop_hint_on_interaction {
            return;
        }
        self.hint_playing = false;
        if let (Some(audio), Some(clip)) = (self.stage.audio(), self.page.idle.hint_clip.as_ref()) {
            audio.stop(clip);
        }
    }

    fn record(&mut self, kind: SceneEventKind) {
        self.sequence_number += 1;
        let event = SceneEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                scene_id: self.page.target_id.clone(),
                sequence_number: self.sequence_number,
                episode_id: self.episode_id,
                occurred_at: self.clock.now(),
            },
            kind,
        };
        debug!(
            event_type = %event.metadata.event_type,
            sequence_number = event.metadata.sequence_number,
            "scene event recorded"
        );
        for observer in &self.observers {
            observer.on_scene_event(&event);
        }
        self.pending_events.push(event);
    }
}

impl EventOutbox for SceneController {
    type Event = SceneEvent;

    fn stream_id(&self) -> &str {
        &self.page.target_id
    }

    fn pending_events(&self) -> &[SceneEvent] {
        &self.pending_events
    }

    fn clear_pending_events(&mut self) {
        self.pending_events.clear();
    }
}
