//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Runtime scene operations never fail; these errors only surface while a
/// page definition is being loaded and validated.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A validation error in a page definition.
    #[error("validation error: {0}")]
    Validation(String),

    /// A configuration source could not be read or parsed.
    #[error("configuration error: {0}")]
    Configuration(String),
}
