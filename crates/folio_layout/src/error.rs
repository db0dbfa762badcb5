//! Layout error types
//!
//! Only page composition can fail. Per-frame derivations are total and
//! degrade to no-ops instead.

use thiserror::Error;

use crate::trigger::TriggerParseError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("section list is empty")]
    EmptySectionList,

    #[error("duplicate section `{0}`")]
    DuplicateSection(String),

    #[error(transparent)]
    Trigger(#[from] TriggerParseError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
