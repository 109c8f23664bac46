//! Player configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_FRAME_RATE: u32 = 30;
const MAX_FRAME_RATE: u32 = 1000;

/// Player settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Book YAML (`STORYBOOK_BOOK`).
    pub book_path: PathBuf,
    /// Input script YAML (`STORYBOOK_SCRIPT`).
    pub script_path: PathBuf,
    /// Ticks per second (`STORYBOOK_FRAME_RATE`, default 30).
    pub frame_rate: u32,
    /// Pace ticks in wall-clock time (`STORYBOOK_REALTIME`, default false).
    pub realtime: bool,
}

impl PlayerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let book_path = lookup("STORYBOOK_BOOK")
            .ok_or_else(|| AppError::Config("STORYBOOK_BOOK environment variable must be set".into()))?;
        let script_path = lookup("STORYBOOK_SCRIPT").ok_or_else(|| {
            AppError::Config("STORYBOOK_SCRIPT environment variable must be set".into())
        })?;

        let frame_rate: u32 = lookup("STORYBOOK_FRAME_RATE")
            .map_or(Ok(DEFAULT_FRAME_RATE), |raw| raw.parse())
            .map_err(|e| AppError::Config(format!("STORYBOOK_FRAME_RATE must be a valid u32: {e}")))?;
        if !(1..=MAX_FRAME_RATE).contains(&frame_rate) {
            return Err(AppError::Config(format!(
                "STORYBOOK_FRAME_RATE must be between 1 and {MAX_FRAME_RATE}"
            )));
        }

        let realtime = match lookup("STORYBOOK_REALTIME").as_deref() {
            None => false,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "STORYBOOK_REALTIME must be true or false, got `{other}`"
                )));
            }
        };

        Ok(Self {
            book_path: book_path.into(),
            script_path: script_path.into(),
            frame_rate,
            realtime,
        })
    }

    /// Returns the duration of one tick.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate
    }
}
