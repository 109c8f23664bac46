//! Collaborator ports.
//!
//! A scene never renders, plays audio or animates anything itself. It
//! issues commands to the collaborators bound into its [`Stage`], each of
//! which is optional: an unbound collaborator means the matching side
//! effect is skipped while timing carries on unchanged.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A named audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioRef(pub String);

impl AudioRef {
    /// Creates a clip reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the clip name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a clip should be played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playback {
    /// Play once.
    #[default]
    OneShot,
    /// Loop until stopped.
    Looping,
}

/// An animation cue addressed to one character.
///
/// Cues are checked against the page's declared catalogue when the page is
/// loaded, so a dispatched cue always names a trigger the character has.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationCue {
    /// The character whose animation collaborator receives the cue.
    pub character: String,
    /// The trigger name.
    pub cue: String,
}

impl AnimationCue {
    /// Creates a cue.
    #[must_use]
    pub fn new(character: impl Into<String>, cue: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            cue: cue.into(),
        }
    }
}

impl fmt::Display for AnimationCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.character, self.cue)
    }
}

/// Player-facing feedback that ends a phase of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// Every collection goal has been met.
    Win,
    /// The player has been idle for too long.
    IdleHint,
}

/// Subtitle / dialogue panel.
pub trait SubtitlePanel: Send + Sync {
    /// Shows `text` when `visible`, hides the panel otherwise.
    fn display(&self, text: Option<&str>, visible: bool);
}

/// Audio playback and clip metadata.
pub trait AudioPlayer: Send + Sync {
    /// Starts playing a clip.
    fn play(&self, clip: &AudioRef, playback: Playback);

    /// Stops a clip if it is playing.
    fn stop(&self, clip: &AudioRef);

    /// Returns the clip's length, or `None` if the clip is unknown.
    fn clip_length(&self, clip: &AudioRef) -> Option<Duration>;
}

/// Named duration lookups (e.g. per-line dialogue durations).
pub trait DurationProvider: Send + Sync {
    /// Returns the duration registered under `key`.
    fn duration_for(&self, key: &str) -> Option<Duration>;
}

/// Character animation dispatch.
pub trait AnimationDriver: Send + Sync {
    /// Fires an animation trigger.
    fn trigger(&self, cue: &AnimationCue);

    /// Returns every character to its default pose.
    fn reset_all(&self);
}

/// Collection progress widgets.
pub trait ProgressDisplay: Send + Sync {
    /// Updates the progress of one category, `fraction` in `[0, 1]`.
    fn update_category(&self, category: &str, fraction: f32);

    /// Updates the overall progress, `fraction` in `[0, 1]`.
    fn update_overall(&self, fraction: f32);
}

/// Win / idle-hint feedback.
pub trait FeedbackSink: Send + Sync {
    /// Dispatches terminal feedback.
    fn terminal_feedback(&self, kind: FeedbackKind);
}

/// The root of a page's AR content.
pub trait ContentRoot: Send + Sync {
    /// Shows or hides the page's content.
    fn set_visible(&self, visible: bool);
}

/// The set of collaborators a scene issues commands to.
#[derive(Clone, Default)]
pub struct Stage {
    subtitles: Option<Arc<dyn SubtitlePanel>>,
    audio: Option<Arc<dyn AudioPlayer>>,
    durations: Option<Arc<dyn DurationProvider>>,
    animation: Option<Arc<dyn AnimationDriver>>,
    progress: Option<Arc<dyn ProgressDisplay>>,
    feedback: Option<Arc<dyn FeedbackSink>>,
    content: Option<Arc<dyn ContentRoot>>,
}

impl Stage {
    /// Creates a stage with no collaborators bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds one collaborator that implements every port.
    #[must_use]
    pub fn bind_all<T>(collaborator: &Arc<T>) -> Self
    where
        T: SubtitlePanel
            + AudioPlayer
            + DurationProvider
            + AnimationDriver
            + ProgressDisplay
            + FeedbackSink
            + ContentRoot
            + 'static,
    {
        Self {
            subtitles: Some(collaborator.clone()),
            audio: Some(collaborator.clone()),
            durations: Some(collaborator.clone()),
            animation: Some(collaborator.clone()),
            progress: Some(collaborator.clone()),
            feedback: Some(collaborator.clone()),
            content: Some(collaborator.clone()),
        }
    }

    /// Binds the subtitle panel.
    #[must_use]
    pub fn with_subtitles(mut self, subtitles: Arc<dyn SubtitlePanel>) -> Self {
        self.subtitles = Some(subtitles);
        self
    }

    /// Binds the audio player.
    #[must_use]
    pub fn with_audio(mut self, audio: Arc<dyn AudioPlayer>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Binds the duration provider.
    #[must_use]
    pub fn with_durations(mut self, durations: Arc<dyn DurationProvider>) -> Self {
        self.durations = Some(durations);
        self
    }

    /// Binds the animation driver.
    #[must_use]
    pub fn with_animation(mut self, animation: Arc<dyn AnimationDriver>) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Binds the progress display.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressDisplay>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Binds the feedback sink.
    #[must_use]
    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackSink>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    /// Binds the content root.
    #[must_use]
    pub fn with_content(mut self, content: Arc<dyn ContentRoot>) -> Self {
        self.content = Some(content);
        self
    }

    /// Returns the subtitle panel, if bound.
    #[must_use]
    pub fn subtitles(&self) -> Option<&dyn SubtitlePanel> {
        self.subtitles.as_deref()
    }

    /// Returns the audio player, if bound.
    #[must_use]
    pub fn audio(&self) -> Option<&dyn AudioPlayer> {
        self.audio.as_deref()
    }

    /// Returns the duration provider, if bound.
    #[must_use]
    pub fn durations(&self) -> Option<&dyn DurationProvider> {
        self.durations.as_deref()
    }

    /// Returns the animation driver, if bound.
    #[must_use]
    pub fn animation(&self) -> Option<&dyn AnimationDriver> {
        self.animation.as_deref()
    }

    /// Returns the progress display, if bound.
    #[must_use]
    pub fn progress(&self) -> Option<&dyn ProgressDisplay> {
        self.progress.as_deref()
    }

    /// Returns the feedback sink, if bound.
    #[must_use]
    pub fn feedback(&self) -> Option<&dyn FeedbackSink> {
        self.feedback.as_deref()
    }

    /// Returns the content root, if bound.
    #[must_use]
    pub fn content(&self) -> Option<&dyn ContentRoot> {
        self.content.as_deref()
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("subtitles", &self.subtitles.is_some())
            .field("audio", &self.audio.is_some())
            .field("durations", &self.durations.is_some())
            .field("animation", &self.animation.is_some())
            .field("progress", &self.progress.is_some())
            .field("feedback", &self.feedback.is_some())
            .field("content", &self.content.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stage_has_no_collaborators() {
        let stage = Stage::new();
        assert!(stage.subtitles().is_none());
        assert!(stage.audio().is_none());
        assert!(stage.durations().is_none());
        assert!(stage.animation().is_none());
        assert!(stage.progress().is_none());
        assert!(stage.feedback().is_none());
        assert!(stage.content().is_none());
    }

    #[test]
    fn test_cue_displays_as_character_dot_trigger() {
        let cue = AnimationCue::new("hunter", "StartWalking");
        assert_eq!(cue.to_string(), "hunter.StartWalking");
    }
}
