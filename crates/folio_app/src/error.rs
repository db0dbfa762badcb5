//! Error types for folio_app

use folio_animation::ParseEasingError;
use folio_layout::{LayoutError, TriggerParseError};
use thiserror::Error;

/// Errors that can occur while assembling a page
///
/// Only loading content or configuration fails. Once a page is built,
/// scroll, pointer and frame handling never error.
#[derive(Error, Debug)]
pub enum FolioError {
    /// Content file is not valid
    #[error("content parsing failed: {0}")]
    ContentParse(String),

    /// Page configuration is not valid
    #[error("config parsing failed: {0}")]
    ConfigParse(String),

    /// Reading a file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidEasing(#[from] ParseEasingError),

    #[error(transparent)]
    InvalidTrigger(#[from] TriggerParseError),

    /// A section referenced by content or config is not on the page
    #[error("unknown section `{0}`")]
    UnknownSection(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for FolioError {
    fn from(err: anyhow::Error) -> Self {
        FolioError::Other(format!("{err:#}"))
    }
}

impl From<LayoutError> for FolioError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Trigger(err) => FolioError::InvalidTrigger(err),
            other => FolioError::ConfigParse(other.to_string()),
        }
    }
}

/// Result type for folio_app operations
pub type Result<T> = std::result::Result<T, FolioError>;
