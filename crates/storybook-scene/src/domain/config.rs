//! Page and book definitions.
//!
//! A book file is YAML. Durations are written in seconds, animation cues as
//! `character.cue` and checked against each page's `characters` catalogue:
//!
//! ```yaml
//! clips:
//!   page3_intro: 6.5
//! pages:
//!   - target_id: page3
//!     characters:
//!       hunter: [StartWalking, StopAndLaugh]
//!     intro:
//!       - kind: narrate
//!         text: "Nothing escapes me!"
//!         audio: page3_intro
//!       - kind: animate
//!         cue: hunter.StartWalking
//!       - kind: wait
//!         duration: 5
//!     goals: { apple: 5, fish: 2 }
//!     idle: { threshold_secs: 5, hint_clip: page3_hint }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Duration;

use serde::Deserialize;
use storybook_core::error::DomainError;
use storybook_core::stage::{AnimationCue, AudioRef};
use storybook_idle::IdlePolicy;
use storybook_progress::{CategoryGoals, CollectibleItem};
use storybook_timeline::{
    AudioCue, DurationSource, Narration, Reveal, SequencerConfig, StepList, TimelineStep,
};

const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(5);

/// Characters and the animation triggers each one understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueCatalogue(BTreeMap<String, BTreeSet<String>>);

impl CueCatalogue {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a character and its triggers.
    #[must_use]
    pub fn with_character<I, S>(mut self, character: &str, cues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(character.to_owned())
            .or_default()
            .extend(cues.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if the character declares the trigger.
    #[must_use]
    pub fn contains(&self, cue: &AnimationCue) -> bool {
        self.0
            .get(&cue.character)
            .is_some_and(|cues| cues.contains(&cue.cue))
    }

    /// Parses a `character.cue` reference and checks it against the
    /// catalogue.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the reference is malformed or
    /// names an undeclared character or trigger.
    pub fn resolve(&self, reference: &str) -> Result<AnimationCue, DomainError> {
        let Some((character, cue)) = reference.split_once('.') else {
            return Err(DomainError::Validation(format!(
                "animation cue `{reference}` must be written as `character.cue`"
            )));
        };
        let cue = AnimationCue::new(character.trim(), cue.trim());
        self.check(&cue)?;
        Ok(cue)
    }

    fn check(&self, cue: &AnimationCue) -> Result<(), DomainError> {
        if self.contains(cue) {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "animation cue `{cue}` is not declared in the page's characters"
            )))
        }
    }
}

/// Idle-nudge settings for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleConfig {
    /// Idle time before the nudge.
    pub threshold: Duration,
    /// What an accepted interaction does to the countdown.
    pub policy: IdlePolicy,
    /// Clip played with the nudge.
    pub hint_clip: Option<AudioRef>,
    /// Stop the hint clip on the next accepted interaction.
    pub stop_hint_on_interaction: bool,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_IDLE_THRESHOLD,
            policy: IdlePolicy::DisarmOnInteraction,
            hint_clip: None,
            stop_hint_on_interaction: true,
        }
    }
}

/// A validated page definition.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// The image target that activates the page.
    pub target_id: String,
    /// Whether `Limited` tracking starts an episode.
    pub accept_limited_tracking: bool,
    /// Sequencer settings for this page's timelines.
    pub sequencer: SequencerConfig,
    /// Declared characters and cues.
    pub cues: CueCatalogue,
    /// Played when the target is found.
    pub intro: StepList,
    /// Collection goals; `None` makes the page passive.
    pub goals: Option<CategoryGoals>,
    /// Idle-nudge settings, used only on pages with goals.
    pub idle: IdleConfig,
    /// Played once when every goal is met.
    pub win: StepList,
}

impl PageConfig {
    /// A passive page with empty timelines.
    #[must_use]
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            accept_limited_tracking: true,
            sequencer: SequencerConfig::default(),
            cues: CueCatalogue::default(),
            intro: Vec::<TimelineStep>::new().into(),
            goals: None,
            idle: IdleConfig::default(),
            win: Vec::<TimelineStep>::new().into(),
        }
    }

    #[must_use]
    pub fn with_cues(mut self, cues: CueCatalogue) -> Self {
        self.cues = cues;
        self
    }

    #[must_use]
    pub fn with_intro(mut self, steps: impl Into<StepList>) -> Self {
        self.intro = steps.into();
        self
    }

    #[must_use]
    pub fn with_goals(mut self, goals: CategoryGoals) -> Self {
        self.goals = Some(goals);
        self
    }

    #[must_use]
    pub fn with_idle(mut self, idle: IdleConfig) -> Self {
        self.idle = idle;
        self
    }

    #[must_use]
    pub fn with_win(mut self, steps: impl Into<StepList>) -> Self {
        self.win = steps.into();
        self
    }

    #[must_use]
    pub fn with_limited_tracking(mut self, accept: bool) -> Self {
        self.accept_limited_tracking = accept;
        self
    }

    #[must_use]
    pub fn with_default_step_duration(mut self, duration: Duration) -> Self {
        self.sequencer.default_step_duration = duration;
        self
    }

    /// Checks every cue in both timelines against the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an empty target id or an
    /// undeclared cue.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.target_id.trim().is_empty() {
            return Err(DomainError::Validation("page target_id is empty".to_owned()));
        }
        for step in self.intro.iter().chain(self.win.iter()) {
            let cue = match step {
                TimelineStep::Narrate(narration) => narration.cue.as_ref(),
                TimelineStep::Animate { cue, .. } => Some(cue),
                TimelineStep::Wait { .. } => None,
            };
            if let Some(cue) = cue {
                self.cues.check(cue).map_err(|e| in_page(&self.target_id, e))?;
            }
        }
        Ok(())
    }
}

/// A validated book: its pages plus the clip-length and named-duration
/// tables the host answers duration queries from.
#[derive(Debug, Clone, Default)]
pub struct BookConfig {
    pub pages: Vec<PageConfig>,
    pub clips: BTreeMap<String, Duration>,
    pub durations: BTreeMap<String, Duration>,
}

impl BookConfig {
    /// Parses and validates a YAML book.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the YAML cannot be parsed and
    /// `DomainError::Validation` if a page is invalid, two pages share a
    /// target id, or a duration is negative or not finite.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let file: BookFile = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Configuration(format!("invalid book yaml: {e}")))?;

        let mut seen = HashSet::new();
        let mut pages = Vec::with_capacity(file.pages.len());
        for raw in file.pages {
            if !seen.insert(raw.target_id.clone()) {
                return Err(DomainError::Validation(format!(
                    "duplicate page for target `{}`",
                    raw.target_id
                )));
            }
            let target_id = raw.target_id.clone();
            let page = raw.into_page().map_err(|e| in_page(&target_id, e))?;
            page.validate()?;
            pages.push(page);
        }

        Ok(Self {
            pages,
            clips: seconds_table(file.clips, "clips")?,
            durations: seconds_table(file.durations, "durations")?,
        })
    }

    /// Returns the page for a target.
    #[must_use]
    pub fn page(&self, target_id: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.target_id == target_id)
    }
}

fn in_page(target_id: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Validation(msg) => DomainError::Validation(format!("page `{target_id}`: {msg}")),
        other => other,
    }
}

fn seconds(value: f64, field: &str) -> Result<Duration, DomainError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| DomainError::Validation(format!("{field}: `{value}` is not a valid number of seconds")))
}

fn seconds_table(
    table: BTreeMap<String, f64>,
    field: &str,
) -> Result<BTreeMap<String, Duration>, DomainError> {
    table
        .into_iter()
        .map(|(key, value)| seconds(value, &format!("{field}.{key}")).map(|d| (key, d)))
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_idle_threshold_secs() -> f64 {
    DEFAULT_IDLE_THRESHOLD.as_secs_f64()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BookFile {
    pages: Vec<PageFile>,
    #[serde(default)]
    clips: BTreeMap<String, f64>,
    #[serde(default)]
    durations: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageFile {
    target_id: String,
    #[serde(default = "default_true")]
    accept_limited_tracking: bool,
    default_step_secs: Option<f64>,
    #[serde(default)]
    characters: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    intro: Vec<StepFile>,
    goals: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    items: Vec<CollectibleItem>,
    #[serde(default)]
    idle: IdleFile,
    #[serde(default)]
    win: Vec<StepFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdleFile {
    #[serde(default = "default_idle_threshold_secs")]
    threshold_secs: f64,
    #[serde(default)]
    policy: IdlePolicy,
    hint_clip: Option<String>,
    #[serde(default = "default_true")]
    stop_hint_on_interaction: bool,
}

impl Default for IdleFile {
    fn default() -> Self {
        Self {
            threshold_secs: default_idle_threshold_secs(),
            policy: IdlePolicy::default(),
            hint_clip: None,
            stop_hint_on_interaction: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StepFile {
    Narrate {
        text: Option<String>,
        audio: Option<String>,
        #[serde(default)]
        looping: bool,
        cue: Option<String>,
        duration: Option<DurationFile>,
        typewriter_secs: Option<f64>,
        #[serde(default)]
        keep_subtitle: bool,
    },
    Animate {
        cue: String,
        audio: Option<String>,
        #[serde(default)]
        looping: bool,
        stop_audio: Option<String>,
    },
    Wait {
        duration: DurationFile,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DurationFile {
    Secs(f64),
    Clip {
        clip: String,
        fallback_secs: Option<f64>,
    },
    Query {
        query: String,
        fallback_secs: Option<f64>,
    },
}

impl PageFile {
    fn into_page(self) -> Result<PageConfig, DomainError> {
        let cues = self
            .characters
            .into_iter()
            .fold(CueCatalogue::new(), |catalogue, (character, cues)| {
                catalogue.with_character(&character, cues)
            });

        let goals = match (self.goals, self.items.is_empty()) {
            (Some(_), false) => {
                return Err(DomainError::Validation(
                    "declare either `goals` or `items`, not both".to_owned(),
                ));
            }
            (Some(goals), true) => Some(goals.into_iter().collect::<CategoryGoals>()),
            (None, false) => {
                let mut seen = BTreeSet::new();
                if let Some(item) = self.items.iter().find(|i| !seen.insert(i.item_id.as_str())) {
                    return Err(DomainError::Validation(format!(
                        "item `{}` is declared twice",
                        item.item_id
                    )));
                }
                Some(CategoryGoals::from_items(&self.items))
            }
            (None, true) => None,
        };

        let mut sequencer = SequencerConfig::default();
        if let Some(secs) = self.default_step_secs {
            sequencer.default_step_duration = seconds(secs, "default_step_secs")?;
        }

        let idle = IdleConfig {
            threshold: seconds(self.idle.threshold_secs, "idle.threshold_secs")?,
            policy: self.idle.policy,
            hint_clip: self.idle.hint_clip.map(AudioRef::new),
            stop_hint_on_interaction: self.idle.stop_hint_on_interaction,
        };

        let intro = convert_steps(self.intro, &cues, "intro")?;
        let win = convert_steps(self.win, &cues, "win")?;

        Ok(PageConfig {
            target_id: self.target_id,
            accept_limited_tracking: self.accept_limited_tracking,
            sequencer,
            cues,
            intro,
            goals,
            idle,
            win,
        })
    }
}

fn convert_steps(
    steps: Vec<StepFile>,
    cues: &CueCatalogue,
    timeline: &str,
) -> Result<StepList, DomainError> {
    steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| {
            step.into_step(cues)
                .map_err(|e| in_step(timeline, index, e))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Into::into)
}

fn in_step(timeline: &str, index: usize, error: DomainError) -> DomainError {
    match error {
        DomainError::Validation(msg) => {
            DomainError::Validation(format!("{timeline} step {index}: {msg}"))
        }
        other => other,
    }
}

fn audio_cue(clip: String, looping: bool) -> AudioCue {
    if looping {
        AudioCue::looping(clip)
    } else {
        AudioCue::once(clip)
    }
}

impl StepFile {
    fn into_step(self, cues: &CueCatalogue) -> Result<TimelineStep, DomainError> {
        match self {
            Self::Narrate {
                text,
                audio,
                looping,
                cue,
                duration,
                typewriter_secs,
                keep_subtitle,
            } => {
                let duration = match (duration, audio.as_ref()) {
                    (Some(duration), _) => duration.into_source()?,
                    (None, Some(clip)) => DurationSource::clip(clip.clone()),
                    (None, None) => {
                        return Err(DomainError::Validation(
                            "narrate step needs a `duration` or an `audio` clip".to_owned(),
                        ));
                    }
                };
                let mut narration = Narration::new(duration);
                narration.text = text;
                narration.audio = audio.map(|clip| audio_cue(clip, looping));
                narration.cue = cue.as_deref().map(|c| cues.resolve(c)).transpose()?;
                if let Some(per_char) = typewriter_secs {
                    narration.reveal = Reveal::Typewriter {
                        per_char: seconds(per_char, "typewriter_secs")?,
                    };
                }
                narration.hide_after = !keep_subtitle;
                Ok(TimelineStep::Narrate(narration))
            }
            Self::Animate {
                cue,
                audio,
                looping,
                stop_audio,
            } => Ok(TimelineStep::Animate {
                cue: cues.resolve(&cue)?,
                audio: audio.map(|clip| audio_cue(clip, looping)),
                stop_audio: stop_audio.map(AudioRef::new),
            }),
            Self::Wait { duration } => Ok(TimelineStep::wait(duration.into_source()?)),
        }
    }
}

impl DurationFile {
    fn into_source(self) -> Result<DurationSource, DomainError> {
        let fallback = |secs: Option<f64>| secs.map(|s| seconds(s, "fallback_secs")).transpose();
        Ok(match self {
            Self::Secs(secs) => DurationSource::Fixed(seconds(secs, "duration")?),
            Self::Clip {
                clip,
                fallback_secs,
            } => DurationSource::ClipLength {
                clip: AudioRef::new(clip),
                fallback: fallback(fallback_secs)?,
            },
            Self::Query {
                query,
                fallback_secs,
            } => DurationSource::QueryExternal {
                key: query,
                fallback: fallback(fallback_secs)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use storybook_test_support::secs;

    use super::*;

    const BOOK: &str = r#"
clips:
  page3_intro: 6.5
durations:
  dialogue.duck: 4
pages:
  - target_id: page3
    default_step_secs: 2
    characters:
      hunter: [StartWalking, StopAndLaugh]
    intro:
      - kind: narrate
        text: "Nothing escapes me!"
        audio: page3_intro
        cue: hunter.StopAndLaugh
      - kind: animate
        cue: hunter.StartWalking
        audio: footsteps
        looping: true
      - kind: wait
        duration: 5
      - kind: narrate
        text: "Quack|quack"
        duration: { query: dialogue.duck, fallback_secs: 6 }
        typewriter_secs: 0.05
        keep_subtitle: true
    goals: { Apple: 5, fish: 2 }
    idle:
      threshold_secs: 7.5
      policy: restart_on_interaction
      hint_clip: page3_hint
  - target_id: page4
    accept_limited_tracking: false
    items:
      - { item_id: egg-1, category: egg }
      - { item_id: egg-2, category: egg }
      - { item_id: egg-3, category: egg, active: false }
"#;

    #[test]
    fn test_book_loads_pages_and_tables() {
        let book = BookConfig::from_yaml(BOOK).unwrap();

        assert_eq!(book.pages.len(), 2);
        assert_eq!(book.clips.get("page3_intro"), Some(&secs(6.5)));
        assert_eq!(book.durations.get("dialogue.duck"), Some(&secs(4.0)));
    }

    #[test]
    fn test_page_steps_are_converted() {
        let book = BookConfig::from_yaml(BOOK).unwrap();
        let page = book.page("page3").unwrap();

        assert_eq!(page.sequencer.default_step_duration, secs(2.0));
        assert_eq!(page.intro.len(), 4);
        assert_eq!(
            page.intro[0],
            TimelineStep::Narrate(
                Narration::voiced("Nothing escapes me!", "page3_intro")
                    .with_cue(AnimationCue::new("hunter", "StopAndLaugh"))
            )
        );
        assert_eq!(
            page.intro[1],
            TimelineStep::Animate {
                cue: AnimationCue::new("hunter", "StartWalking"),
                audio: Some(AudioCue::looping("footsteps")),
                stop_audio: None,
            }
        );
        assert_eq!(page.intro[2], TimelineStep::wait(DurationSource::secs(5.0)));
        let TimelineStep::Narrate(duck) = &page.intro[3] else {
            panic!("expected a narrate step");
        };
        assert_eq!(
            duck.duration,
            DurationSource::QueryExternal {
                key: "dialogue.duck".to_owned(),
                fallback: Some(secs(6.0)),
            }
        );
        assert_eq!(duck.reveal, Reveal::Typewriter { per_char: secs(0.05) });
        assert!(!duck.hide_after);
    }

    #[test]
    fn test_goals_and_idle_settings_are_read() {
        let book = BookConfig::from_yaml(BOOK).unwrap();
        let page = book.page("page3").unwrap();

        let goals = page.goals.as_ref().unwrap();
        assert_eq!(goals.required("apple"), Some(5));
        assert_eq!(goals.required("fish"), Some(2));
        assert_eq!(page.idle.threshold, secs(7.5));
        assert_eq!(page.idle.policy, IdlePolicy::RestartOnInteraction);
        assert_eq!(page.idle.hint_clip, Some(AudioRef::new("page3_hint")));
    }

    #[test]
    fn test_goals_derive_from_active_items() {
        let book = BookConfig::from_yaml(BOOK).unwrap();
        let page = book.page("page4").unwrap();

        assert!(!page.accept_limited_tracking);
        assert_eq!(page.goals.as_ref().unwrap().required("egg"), Some(2));
        assert_eq!(page.idle, IdleConfig::default());
        assert!(page.intro.is_empty());
    }

    #[test]
    fn test_duplicate_item_id_is_rejected() {
        let yaml = r"
pages:
  - target_id: page4
    items:
      - { item_id: egg-1, category: egg }
      - { item_id: egg-1, category: egg }
";

        let error = BookConfig::from_yaml(yaml).unwrap_err();

        assert!(matches!(error, DomainError::Validation(_)));
        assert!(error.to_string().contains("egg-1"));
    }

    #[test]
    fn test_item_goals_admit_only_active_items() {
        let book = BookConfig::from_yaml(BOOK).unwrap();
        let goals = book.page("page4").unwrap().goals.clone().unwrap();

        assert!(goals.admits_item("egg", "egg-1"));
        assert!(!goals.admits_item("egg", "egg-3"));
    }

    #[test]
    fn test_undeclared_cue_is_rejected() {
        let yaml = r"
pages:
  - target_id: page3
    characters:
      hunter: [StartWalking]
    intro:
      - kind: animate
        cue: hunter.Dance
";

        let error = BookConfig::from_yaml(yaml).unwrap_err();

        assert!(matches!(error, DomainError::Validation(_)));
        assert!(error.to_string().contains("hunter.Dance"));
        assert!(error.to_string().contains("page `page3`"));
    }

    #[test]
    fn test_malformed_cue_reference_is_rejected() {
        let yaml = r"
pages:
  - target_id: page3
    win:
      - kind: animate
        cue: StartWalking
";

        let error = BookConfig::from_yaml(yaml).unwrap_err();

        assert!(error.to_string().contains("character.cue"));
    }

    #[test]
    fn test_duplicate_targets_are_rejected() {
        let yaml = r"
pages:
  - target_id: page3
  - target_id: page3
";

        let error = BookConfig::from_yaml(yaml).unwrap_err();

        assert!(error.to_string().contains("duplicate page"));
    }

    #[test]
    fn test_negative_seconds_are_rejected() {
        let yaml = r"
pages:
  - target_id: page3
    intro:
      - kind: wait
        duration: -1
";

        let error = BookConfig::from_yaml(yaml).unwrap_err();

        assert!(matches!(error, DomainError::Validation(_)));
        assert!(error.to_string().contains("intro step 0"));
    }

    #[test]
    fn test_narrate_without_duration_or_audio_is_rejected() {
        let yaml = r"
pages:
  - target_id: page3
    intro:
      - kind: narrate
        text: silent
";

        assert!(BookConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_goals_and_items_together_are_rejected() {
        let yaml = r"
pages:
  - target_id: page3
    goals: { egg: 1 }
    items:
      - { item_id: egg-1, category: egg }
";

        assert!(BookConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_unparseable_yaml_is_a_configuration_error() {
        let error = BookConfig::from_yaml("pages: [").unwrap_err();

        assert!(matches!(error, DomainError::Configuration(_)));
    }

    #[test]
    fn test_programmatic_page_is_validated_against_catalogue() {
        let page = PageConfig::new("page3")
            .with_cues(CueCatalogue::new().with_character("duck", ["Swim"]))
            .with_win(vec![TimelineStep::animate(AnimationCue::new("duck", "Fly"))]);

        assert!(page.validate().is_err());
    }
}
