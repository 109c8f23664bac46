//! Timeline steps and their duration sources.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storybook_core::stage::{AnimationCue, AudioRef, Playback, Stage};

/// The kind of a timeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Subtitle and/or voice line.
    Narrate,
    /// Animation cue with zero wait.
    Animate,
    /// Pure wait.
    Wait,
}

/// Where a step's wait duration comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationSource {
    /// A literal duration.
    Fixed(Duration),
    /// A duration looked up by key from the duration provider.
    QueryExternal {
        /// Lookup key.
        key: String,
        /// Used instead of the sequencer default when the lookup fails.
        fallback: Option<Duration>,
    },
    /// The length of an audio clip.
    ClipLength {
        /// The clip to measure.
        clip: AudioRef,
        /// Used instead of the sequencer default when the clip is unknown.
        fallback: Option<Duration>,
    },
}

/// A duration after resolution against the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDuration {
    /// The duration to wait.
    pub duration: Duration,
    /// `true` when the source was unavailable and a fallback was used.
    pub fell_back: bool,
}

impl DurationSource {
    /// Shorthand for a fixed duration in seconds. Negative and NaN inputs
    /// clamp to zero; values too large for a `Duration` clamp to the maximum.
    #[must_use]
    pub fn secs(seconds: f64) -> Self {
        let duration = if seconds.is_nan() || seconds <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        };
        Self::Fixed(duration)
    }

    /// Shorthand for a clip-length duration without a per-step fallback.
    #[must_use]
    pub fn clip(clip: impl Into<String>) -> Self {
        Self::ClipLength {
            clip: AudioRef::new(clip),
            fallback: None,
        }
    }

    /// Shorthand for a keyed duration without a per-step fallback.
    #[must_use]
    pub fn query(key: impl Into<String>) -> Self {
        Self::QueryExternal {
            key: key.into(),
            fallback: None,
        }
    }

    /// Resolves the duration. A failed lookup, a missing collaborator or a
    /// zero answer all resolve to the step's fallback, else `default`.
    #[must_use]
    pub fn resolve(&self, stage: &Stage, default: Duration) -> ResolvedDuration {
        let (answer, fallback) = match self {
            Self::Fixed(duration) => {
                return ResolvedDuration {
                    duration: *duration,
                    fell_back: false,
                };
            }
            Self::QueryExternal { key, fallback } => (
                stage.durations().and_then(|d| d.duration_for(key)),
                *fallback,
            ),
            Self::ClipLength { clip, fallback } => {
                (stage.audio().and_then(|a| a.clip_length(clip)), *fallback)
            }
        };

        match answer {
            Some(duration) if !duration.is_zero() => ResolvedDuration {
                duration,
                fell_back: false,
            },
            _ => ResolvedDuration {
                duration: fallback.unwrap_or(default),
                fell_back: true,
            },
        }
    }
}

/// How narration text appears on the subtitle panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Reveal {
    /// The whole line at once.
    #[default]
    Instant,
    /// Character by character; `|` in the text inserts a one-second pause.
    Typewriter {
        /// Delay between characters.
        per_char: Duration,
    },
}

/// A clip to start when a step is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCue {
    /// The clip.
    pub clip: AudioRef,
    /// Playback mode.
    pub playback: Playback,
}

impl AudioCue {
    /// A one-shot clip.
    #[must_use]
    pub fn once(clip: impl Into<String>) -> Self {
        Self {
            clip: AudioRef::new(clip),
            playback: Playback::OneShot,
        }
    }

    /// A looping clip.
    #[must_use]
    pub fn looping(clip: impl Into<String>) -> Self {
        Self {
            clip: AudioRef::new(clip),
            playback: Playback::Looping,
        }
    }
}

/// A narration line: subtitle, voice clip and an optional cue, held for
/// the resolved duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    /// Subtitle text.
    pub text: Option<String>,
    /// Voice clip.
    pub audio: Option<AudioCue>,
    /// Animation cue fired together with the line.
    pub cue: Option<AnimationCue>,
    /// How long the line is held.
    pub duration: DurationSource,
    /// How the subtitle appears.
    pub reveal: Reveal,
    /// Hide the subtitle panel when the step ends.
    pub hide_after: bool,
}

impl Narration {
    /// A silent, text-less line held for `duration`.
    #[must_use]
    pub fn new(duration: DurationSource) -> Self {
        Self {
            text: None,
            audio: None,
            cue: None,
            duration,
            reveal: Reveal::Instant,
            hide_after: true,
        }
    }

    /// A voiced line held for the length of its clip.
    #[must_use]
    pub fn voiced(text: impl Into<String>, clip: impl Into<String>) -> Self {
        let clip = clip.into();
        Self::new(DurationSource::clip(clip.clone()))
            .with_text(text)
            .with_audio(AudioCue::once(clip))
    }

    /// Sets the subtitle text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the voice clip.
    #[must_use]
    pub fn with_audio(mut self, audio: AudioCue) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Sets the accompanying animation cue.
    #[must_use]
    pub fn with_cue(mut self, cue: AnimationCue) -> Self {
        self.cue = Some(cue);
        self
    }

    /// Sets the reveal mode.
    #[must_use]
    pub fn with_reveal(mut self, reveal: Reveal) -> Self {
        self.reveal = reveal;
        self
    }

    /// Leaves the subtitle visible after the step ends.
    #[must_use]
    pub fn keep_subtitle(mut self) -> Self {
        self.hide_after = false;
        self
    }
}

/// One unit of scripted playback.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineStep {
    /// Show/voice a line and hold it.
    Narrate(Narration),
    /// Fire an animation cue and move on immediately.
    Animate {
        /// The cue.
        cue: AnimationCue,
        /// Clip started with the cue (e.g. a looping footstep sound).
        audio: Option<AudioCue>,
        /// Clip stopped before the cue fires.
        stop_audio: Option<AudioRef>,
    },
    /// Wait without side effects.
    Wait {
        /// How long to wait.
        duration: DurationSource,
    },
}

impl TimelineStep {
    /// A bare animation cue.
    #[must_use]
    pub fn animate(cue: AnimationCue) -> Self {
        Self::Animate {
            cue,
            audio: None,
            stop_audio: None,
        }
    }

    /// A wait.
    #[must_use]
    pub fn wait(duration: DurationSource) -> Self {
        Self::Wait { duration }
    }

    /// Returns the step's kind.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Narrate(_) => StepKind::Narrate,
            Self::Animate { .. } => StepKind::Animate,
            Self::Wait { .. } => StepKind::Wait,
        }
    }
}

impl From<Narration> for TimelineStep {
    fn from(narration: Narration) -> Self {
        Self::Narrate(narration)
    }
}

/// An immutable step list shared between the page definition and its runs.
pub type StepList = Arc<[TimelineStep]>;

#[cfg(test)]
mod tests {
    use super::*;
    use storybook_test_support::{RecordingStage, secs};

    #[test]
    fn test_out_of_range_seconds_are_clamped() {
        assert_eq!(DurationSource::secs(-1.0), DurationSource::Fixed(Duration::ZERO));
        assert_eq!(DurationSource::secs(f64::NAN), DurationSource::Fixed(Duration::ZERO));
        assert_eq!(DurationSource::secs(f64::INFINITY), DurationSource::Fixed(Duration::MAX));
    }

    #[test]
    fn test_fixed_duration_never_falls_back() {
        let resolved = DurationSource::secs(0.7).resolve(&Stage::new(), secs(3.0));

        assert_eq!(resolved.duration, secs(0.7));
        assert!(!resolved.fell_back);
    }

    #[test]
    fn test_clip_length_comes_from_audio_player() {
        let (_, stage) = RecordingStage::new().with_clip("intro", 7.5).into_stage();

        let resolved = DurationSource::clip("intro").resolve(&stage, secs(3.0));

        assert_eq!(resolved.duration, secs(7.5));
        assert!(!resolved.fell_back);
    }

    #[test]
    fn test_unknown_clip_uses_step_fallback_before_default() {
        let (_, stage) = RecordingStage::new().into_stage();
        let source = DurationSource::ClipLength {
            clip: AudioRef::new("missing"),
            fallback: Some(secs(6.0)),
        };

        let resolved = source.resolve(&stage, secs(3.0));

        assert_eq!(resolved.duration, secs(6.0));
        assert!(resolved.fell_back);
    }

    #[test]
    fn test_zero_answer_is_treated_as_missing() {
        let (_, stage) = RecordingStage::new()
            .with_duration("dialogue.duck", 0.0)
            .into_stage();

        let resolved = DurationSource::query("dialogue.duck").resolve(&stage, secs(5.0));

        assert_eq!(resolved.duration, secs(5.0));
        assert!(resolved.fell_back);
    }

    #[test]
    fn test_query_without_provider_falls_back_to_default() {
        let resolved = DurationSource::query("dialogue.chick").resolve(&Stage::new(), secs(3.0));

        assert_eq!(resolved.duration, secs(3.0));
        assert!(resolved.fell_back);
    }

    #[test]
    fn test_voiced_narration_waits_for_its_clip() {
        let narration = Narration::voiced("Once upon a time", "narration1");

        assert_eq!(narration.duration, DurationSource::clip("narration1"));
        assert_eq!(narration.audio, Some(AudioCue::once("narration1")));
        assert!(narration.hide_after);
    }
}
