//! Test stage — a collaborator that records every command it receives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storybook_core::stage::{
    AnimationCue, AnimationDriver, AudioPlayer, AudioRef, ContentRoot, DurationProvider,
    FeedbackKind, FeedbackSink, Playback, ProgressDisplay, Stage, SubtitlePanel,
};

/// One command issued to a collaborator port.
#[derive(Debug, Clone, PartialEq)]
pub enum StageCommand {
    /// `SubtitlePanel::display`.
    Display {
        /// Text shown, if any.
        text: Option<String>,
        /// Panel visibility.
        visible: bool,
    },
    /// `AudioPlayer::play`.
    PlayAudio {
        /// Clip name.
        clip: String,
        /// Playback mode.
        playback: Playback,
    },
    /// `AudioPlayer::stop`.
    StopAudio {
        /// Clip name.
        clip: String,
    },
    /// `AnimationDriver::trigger`.
    TriggerAnimation(AnimationCue),
    /// `AnimationDriver::reset_all`.
    ResetAnimations,
    /// `ProgressDisplay::update_category`.
    UpdateProgress {
        /// Category name.
        category: String,
        /// Fraction shown.
        fraction: f32,
    },
    /// `ProgressDisplay::update_overall`.
    UpdateOverallProgress(f32),
    /// `FeedbackSink::terminal_feedback`.
    TerminalFeedback(FeedbackKind),
    /// `ContentRoot::set_visible`.
    ContentVisible(bool),
}

/// A stage collaborator that implements every port, records each call and
/// answers clip-length and duration queries from preset tables.
#[derive(Debug, Default)]
pub struct RecordingStage {
    commands: Mutex<Vec<StageCommand>>,
    clip_lengths: HashMap<String, Duration>,
    durations: HashMap<String, Duration>,
}

impl RecordingStage {
    /// Creates a recording stage with empty lookup tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip length in seconds.
    #[must_use]
    pub fn with_clip(mut self, clip: &str, seconds: f64) -> Self {
        self.clip_lengths
            .insert(clip.to_owned(), Duration::from_secs_f64(seconds));
        self
    }

    /// Registers a named duration in seconds.
    #[must_use]
    pub fn with_duration(mut self, key: &str, seconds: f64) -> Self {
        self.durations
            .insert(key.to_owned(), Duration::from_secs_f64(seconds));
        self
    }

    /// Wraps the recorder in an `Arc` and returns it with a `Stage` that has
    /// every port bound to it.
    #[must_use]
    pub fn into_stage(self) -> (Arc<Self>, Stage) {
        let recorder = Arc::new(self);
        let stage = Stage::bind_all(&recorder);
        (recorder, stage)
    }

    /// Returns a snapshot of all recorded commands.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn commands(&self) -> Vec<StageCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Discards all recorded commands.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear(&self) {
        self.commands.lock().unwrap().clear();
    }

    /// Returns the names of every clip played, in order.
    pub fn played_clips(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                StageCommand::PlayAudio { clip, .. } => Some(clip),
                _ => None,
            })
            .collect()
    }

    /// Returns every text shown on the subtitle panel, in order.
    pub fn displayed_texts(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                StageCommand::Display {
                    text: Some(text),
                    visible: true,
                } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Returns every animation cue triggered, in order.
    pub fn triggered_cues(&self) -> Vec<AnimationCue> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                StageCommand::TriggerAnimation(cue) => Some(cue),
                _ => None,
            })
            .collect()
    }

    /// Returns every terminal feedback dispatched, in order.
    pub fn feedback(&self) -> Vec<FeedbackKind> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                StageCommand::TerminalFeedback(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    fn record(&self, command: StageCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

impl SubtitlePanel for RecordingStage {
    fn display(&self, text: Option<&str>, visible: bool) {
        self.record(StageCommand::Display {
            text: text.map(str::to_owned),
            visible,
        });
    }
}

impl AudioPlayer for RecordingStage {
    fn play(&self, clip: &AudioRef, playback: Playback) {
        self.record(StageCommand::PlayAudio {
            clip: clip.as_str().to_owned(),
            playback,
        });
    }

    fn stop(&self, clip: &AudioRef) {
        self.record(StageCommand::StopAudio {
            clip: clip.as_str().to_owned(),
        });
    }

    fn clip_length(&self, clip: &AudioRef) -> Option<Duration> {
        self.clip_lengths.get(clip.as_str()).copied()
    }
}

impl DurationProvider for RecordingStage {
    fn duration_for(&self, key: &str) -> Option<Duration> {
        self.durations.get(key).copied()
    }
}

impl AnimationDriver for RecordingStage {
    fn trigger(&self, cue: &AnimationCue) {
        self.record(StageCommand::TriggerAnimation(cue.clone()));
    }

    fn reset_all(&self) {
        self.record(StageCommand::ResetAnimations);
    }
}

impl ProgressDisplay for RecordingStage {
    fn update_category(&self, category: &str, fraction: f32) {
        self.record(StageCommand::UpdateProgress {
            category: category.to_owned(),
            fraction,
        });
    }

    fn update_overall(&self, fraction: f32) {
        self.record(StageCommand::UpdateOverallProgress(fraction));
    }
}

impl FeedbackSink for RecordingStage {
    fn terminal_feedback(&self, kind: FeedbackKind) {
        self.record(StageCommand::TerminalFeedback(kind));
    }
}

impl ContentRoot for RecordingStage {
    fn set_visible(&self, visible: bool) {
        self.record(StageCommand::ContentVisible(visible));
    }
}
