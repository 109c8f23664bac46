//! Scripted input timelines.
//!
//! ```yaml
//! run_secs: 20
//! inputs:
//!   - at_secs: 0
//!     recognition: { target_id: page3, state: tracked }
//!   - at_secs: 4.5
//!     interaction: { target_id: page3, category: apple, item_id: apple-1 }
//! ```

use std::time::Duration;

use serde::Deserialize;
use storybook_core::signal::{InteractionSignal, RecognitionEvent, TrackingState};

use crate::error::AppError;

/// One scripted host signal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    /// A tracker status change.
    Recognition {
        /// The image target.
        target_id: String,
        /// The reported state.
        state: TrackingState,
    },
    /// A player interaction on a page.
    Interaction {
        /// The page the item is on.
        target_id: String,
        /// The item's category.
        category: String,
        /// The item.
        item_id: String,
    },
}

impl ScriptAction {
    /// Returns the recognition event, for recognition actions.
    #[must_use]
    pub fn recognition(&self) -> Option<RecognitionEvent> {
        match self {
            Self::Recognition { target_id, state } => {
                Some(RecognitionEvent::new(target_id.clone(), *state))
            }
            Self::Interaction { .. } => None,
        }
    }

    /// Returns the page and signal, for interaction actions.
    #[must_use]
    pub fn interaction(&self) -> Option<(&str, InteractionSignal)> {
        match self {
            Self::Interaction {
                target_id,
                category,
                item_id,
            } => Some((
                target_id.as_str(),
                InteractionSignal::new(category.clone(), item_id.clone()),
            )),
            Self::Recognition { .. } => None,
        }
    }
}

/// A signal and the time it is delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedInput {
    /// Offset from the start of playback.
    pub at: Duration,
    /// The signal.
    pub action: ScriptAction,
}

/// A validated script, inputs in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Total playback time.
    pub run_for: Duration,
    /// Inputs sorted by time; equal times keep file order.
    pub inputs: Vec<TimedInput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    run_secs: f64,
    #[serde(default)]
    inputs: Vec<InputFile>,
}

#[derive(Debug, Deserialize)]
struct InputFile {
    at_secs: f64,
    #[serde(flatten)]
    action: ScriptAction,
}

impl Script {
    /// Parses and validates a YAML script.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Yaml` if the YAML does not match the schema and
    /// `AppError::Config` for negative or non-finite times.
    pub fn from_yaml(source: &str) -> Result<Self, AppError> {
        let file: ScriptFile = serde_yaml::from_str(source)?;
        let run_for = seconds(file.run_secs, "run_secs")?;
        let mut inputs = file
            .inputs
            .into_iter()
            .map(|input| {
                Ok(TimedInput {
                    at: seconds(input.at_secs, "at_secs")?,
                    action: input.action,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        inputs.sort_by_key(|input| input.at);
        Ok(Self { run_for, inputs })
    }
}

fn seconds(value: f64, field: &str) -> Result<Duration, AppError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| AppError::Config(format!("{field}: `{value}` is not a valid number of seconds")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_parses_and_sorts_inputs() {
        let yaml = r"
run_secs: 12
inputs:
  - at_secs: 4.5
    interaction: { target_id: page3, category: apple, item_id: apple-1 }
  - at_secs: 0
    recognition: { target_id: page3, state: tracked }
";

        let script = Script::from_yaml(yaml).unwrap();

        assert_eq!(script.run_for, Duration::from_secs(12));
        assert_eq!(script.inputs[0].at, Duration::ZERO);
        assert_eq!(
            script.inputs[0].action.recognition(),
            Some(RecognitionEvent::new("page3", TrackingState::Tracked))
        );
        let (target, signal) = script.inputs[1].action.interaction().unwrap();
        assert_eq!(target, "page3");
        assert_eq!(signal, InteractionSignal::new("apple", "apple-1"));
    }

    #[test]
    fn test_negative_time_is_rejected() {
        let yaml = r"
run_secs: 5
inputs:
  - at_secs: -1
    recognition: { target_id: page3, state: lost }
";

        assert!(matches!(Script::from_yaml(yaml), Err(AppError::Config(_))));
    }

    #[test]
    fn test_unknown_action_is_a_yaml_error() {
        let yaml = r"
run_secs: 5
inputs:
  - at_secs: 1
    shake: { target_id: page3 }
";

        assert!(matches!(Script::from_yaml(yaml), Err(AppError::Yaml(_))));
    }
}
