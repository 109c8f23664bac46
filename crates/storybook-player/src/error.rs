//! Storybook player — error types.

use storybook_core::error::DomainError;
use thiserror::Error;

/// Startup and playback errors for the player.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A book or script file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A script file is not valid YAML.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A book file failed validation.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_message() {
        let err = AppError::from(DomainError::Validation("bad cue".into()));
        assert_eq!(err.to_string(), "validation error: bad cue");
    }

    #[test]
    fn test_config_error_message() {
        let err = AppError::Config("STORYBOOK_BOOK must be set".into());
        assert_eq!(
            err.to_string(),
            "configuration error: STORYBOOK_BOOK must be set"
        );
    }
}
