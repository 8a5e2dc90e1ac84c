use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Backend identity of a scenario.
///
/// - database ids start at 1, so `NonZero` is free
/// - `Option<ScenarioId>` stays the size of a `u32`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct ScenarioId(NonZeroU32);

impl ScenarioId {
    /// Create a ScenarioId from a raw backend id.
    pub fn new(raw: u32) -> CoreResult<Self> {
        NonZeroU32::new(raw)
            .map(Self)
            .ok_or(CoreError::InvalidScenarioId { value: raw as i64 })
    }

    /// Raw id as sent to the backend.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for ScenarioId {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(CoreError::InvalidScenarioId { value })
    }
}

impl From<ScenarioId> for u32 {
    fn from(id: ScenarioId) -> Self {
        id.get()
    }
}

impl fmt::Debug for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScenarioId({})", self.get())
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
