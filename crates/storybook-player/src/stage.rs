//! A stage that logs every command.
//!
//! Stands in for the AR host's subtitle panel, audio engine, animators and
//! UI. Clip lengths and named durations come from the book's tables.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use storybook_core::stage::{
    AnimationCue, AnimationDriver, AudioPlayer, AudioRef, ContentRoot, DurationProvider,
    FeedbackKind, FeedbackSink, Playback, ProgressDisplay, Stage, SubtitlePanel,
};
use storybook_scene::BookConfig;
use tracing::info;

/// Logs commands through `tracing` and answers duration lookups.
#[derive(Debug, Default)]
pub struct LoggingStage {
    clips: BTreeMap<String, Duration>,
    durations: BTreeMap<String, Duration>,
}

impl LoggingStage {
    /// Creates a stage answering from the book's `clips` and `durations`.
    #[must_use]
    pub fn from_book(book: &BookConfig) -> Self {
        Self {
            clips: book.clips.clone(),
            durations: book.durations.clone(),
        }
    }

    /// Returns a `Stage` with every port bound to this logger.
    #[must_use]
    pub fn into_stage(self) -> Stage {
        Stage::bind_all(&Arc::new(self))
    }
}

impl SubtitlePanel for LoggingStage {
    fn display(&self, text: Option<&str>, visible: bool) {
        info!(command = "display", text, visible, "stage");
    }
}

impl AudioPlayer for LoggingStage {
    fn play(&self, clip: &AudioRef, playback: Playback) {
        info!(command = "play_audio", clip = %clip, ?playback, "stage");
    }

    fn stop(&self, clip: &AudioRef) {
        info!(command = "stop_audio", clip = %clip, "stage");
    }

    fn clip_length(&self, clip: &AudioRef) -> Option<Duration> {
        self.clips.get(clip.as_str()).copied()
    }
}

impl DurationProvider for LoggingStage {
    fn duration_for(&self, key: &str) -> Option<Duration> {
        self.durations.get(key).copied()
    }
}

impl AnimationDriver for LoggingStage {
    fn trigger(&self, cue: &AnimationCue) {
        info!(command = "trigger_animation", cue = %cue, "stage");
    }

    fn reset_all(&self) {
        info!(command = "reset_animations", "stage");
    }
}

impl ProgressDisplay for LoggingStage {
    fn update_category(&self, category: &str, fraction: f32) {
        info!(command = "update_progress", category, fraction, "stage");
    }

    fn update_overall(&self, fraction: f32) {
        info!(command = "update_overall_progress", fraction, "stage");
    }
}

impl FeedbackSink for LoggingStage {
    fn terminal_feedback(&self, kind: FeedbackKind) {
        info!(command = "terminal_feedback", ?kind, "stage");
    }
}

impl ContentRoot for LoggingStage {
    fn set_visible(&self, visible: bool) {
        info!(command = "content_visible", visible, "stage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_answer_from_book_tables() {
        let mut book = BookConfig::default();
        book.clips.insert("intro".to_owned(), Duration::from_millis(6500));
        book.durations.insert("dialogue.duck".to_owned(), Duration::from_secs(4));

        let stage = LoggingStage::from_book(&book).into_stage();

        let audio = stage.audio().unwrap();
        assert_eq!(audio.clip_length(&AudioRef::new("intro")), Some(Duration::from_millis(6500)));
        assert_eq!(audio.clip_length(&AudioRef::new("missing")), None);
        assert_eq!(
            stage.durations().unwrap().duration_for("dialogue.duck"),
            Some(Duration::from_secs(4))
        );
    }
}
