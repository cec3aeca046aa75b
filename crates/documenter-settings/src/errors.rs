//! Settings error types.

use thiserror::Error;

/// Errors that can occur when loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A configuration layer could not be read or extracted.
    #[error("failed to load settings: {0}")]
    Figment(Box<figment::Error>),
    /// A settings value was missing or invalid (e.g. a non-positive budget).
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

impl From<figment::Error> for SettingsError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
