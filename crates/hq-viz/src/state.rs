//! Lifecycle state of a visualization.

use std::fmt;

use crate::error::FetchError;

/// Data readiness of one visualization. Exactly one holds at any time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    /// No dependency value selected.
    #[default]
    Unavailable,
    /// A fetch for the current dependency is in flight.
    Loading,
    /// The payload for the current dependency is cached and can be rendered.
    Displayable,
    /// The last fetch for the current dependency failed.
    Failed(FetchError),
}

impl LifecycleState {
    pub fn is_displayable(&self) -> bool {
        matches!(self, Self::Displayable)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Failure cause, if any.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Short tag for placeholders and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Loading => "loading",
            Self::Displayable => "displayable",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(err) => write!(f, "failed: {}", err),
            other => f.write_str(other.label()),
        }
    }
}
