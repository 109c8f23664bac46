//! The host loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use storybook_core::clock::{Clock, SystemClock};
use storybook_core::event::DomainEvent;
use storybook_core::signal::Signal;
use storybook_core::stage::Stage;
use storybook_scene::{BookConfig, StoryBook};
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::error::AppError;
use crate::script::{Script, TimedInput};
use crate::stage::LoggingStage;

/// What a playback did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Ticks delivered.
    pub frames: u64,
    /// Scriptable inputs delivered.
    pub inputs: usize,
    /// Event type of every scene event, in order.
    pub event_types: Vec<&'static str>,
}

/// Drives a book with fixed-step ticks, delivering scripted inputs at
/// their timestamps.
#[derive(Debug)]
pub struct Player {
    book: StoryBook,
    pending: VecDeque<TimedInput>,
    frame: Duration,
    run_for: Duration,
    elapsed: Duration,
    report: PlaybackReport,
}

impl Player {
    /// Creates a player for `book` bound to `stage`.
    #[must_use]
    pub fn new(
        book: &BookConfig,
        script: Script,
        frame: Duration,
        stage: &Stage,
        clock: &Arc<dyn Clock>,
    ) -> Self {
        Self {
            book: StoryBook::new(book, stage, clock),
            pending: script.inputs.into(),
            frame,
            run_for: script.run_for,
            elapsed: Duration::ZERO,
            report: PlaybackReport::default(),
        }
    }

    /// Returns `true` while there is playback time left.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.elapsed < self.run_for
    }

    /// Delivers the inputs due now, then advances one frame.
    pub fn step(&mut self) {
        while self.pending.front().is_some_and(|input| input.at <= self.elapsed) {
            let Some(input) = self.pending.pop_front() else {
                break;
            };
            self.deliver(&input);
        }
        self.book.tick(self.frame);
        self.elapsed += self.frame;
        self.report.frames += 1;
        self.log_events();
    }

    /// Plays the whole script as fast as possible.
    pub fn run_to_end(&mut self) -> PlaybackReport {
        while self.is_running() {
            self.step();
        }
        self.report.clone()
    }

    /// Plays the whole script, one frame per tick of a wall-clock interval.
    pub async fn run_realtime(&mut self) -> PlaybackReport {
        let mut interval = tokio::time::interval(self.frame);
        while self.is_running() {
            interval.tick().await;
            self.step();
        }
        self.report.clone()
    }

    /// Returns the book being played.
    #[must_use]
    pub fn book(&self) -> &StoryBook {
        &self.book
    }

    fn deliver(&mut self, input: &TimedInput) {
        if let Some(event) = input.action.recognition() {
            trace_signal(input.at, &event);
            self.book.on_recognition(&event);
        } else if let Some((target_id, signal)) = input.action.interaction() {
            trace_signal(input.at, &signal);
            let accepted = self.book.on_interaction(target_id, &signal);
            info!(target_id, item_id = %signal.item_id, accepted, "interaction delivered");
        }
        self.report.inputs += 1;
        self.log_events();
    }

    fn log_events(&mut self) {
        for event in self.book.take_pending_events() {
            info!(
                event_type = event.event_type(),
                scene_id = %event.metadata.scene_id,
                episode_id = %event.metadata.episode_id,
                sequence_number = event.metadata.sequence_number,
                payload = %event.to_payload(),
                "scene event"
            );
            self.report.event_types.push(event.event_type());
        }
    }
}

fn trace_signal(at: Duration, signal: &impl Signal) {
    debug!(
        at_secs = at.as_secs_f64(),
        signal_type = signal.signal_type(),
        ?signal,
        "delivering input"
    );
}

/// Loads the configured book and script and plays them.
///
/// # Errors
///
/// Returns `AppError` if either file cannot be read or fails validation.
pub async fn play(config: &PlayerConfig) -> Result<PlaybackReport, AppError> {
    let book_source = tokio::fs::read_to_string(&config.book_path).await?;
    let script_source = tokio::fs::read_to_string(&config.script_path).await?;
    let book = BookConfig::from_yaml(&book_source)?;
    let script = Script::from_yaml(&script_source)?;

    info!(
        pages = book.pages.len(),
        inputs = script.inputs.len(),
        run_secs = script.run_for.as_secs_f64(),
        frame_rate = config.frame_rate,
        realtime = config.realtime,
        "starting playback"
    );

    let stage = LoggingStage::from_book(&book).into_stage();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut player = Player::new(&book, script, config.frame_interval(), &stage, &clock);

    let report = if config.realtime {
        player.run_realtime().await
    } else {
        player.run_to_end()
    };

    info!(
        frames = report.frames,
        inputs = report.inputs,
        events = report.event_types.len(),
        "playback finished"
    );
    Ok(report)
}
