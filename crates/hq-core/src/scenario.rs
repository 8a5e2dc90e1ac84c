//! Scenario model.
//!
//! A scenario is the dependency value every chart panel watches: selecting a
//! different scenario is what triggers a refetch.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::ScenarioId;

/// Weather profile used by the backend demand model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Hot,
    Typical,
    Cold,
}

impl Weather {
    /// Decode the backend's numeric code. Anything unknown is treated as cold.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Hot,
            2 => Self::Typical,
            _ => Self::Cold,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Hot => 1,
            Self::Typical => 2,
            Self::Cold => 3,
        }
    }
}

/// Consumption behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consumption {
    Normal,
    Conservative,
}

impl Consumption {
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            Self::Normal
        } else {
            Self::Conservative
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Normal => 1,
            Self::Conservative => 2,
        }
    }
}

/// Social / ecological optimism level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Optimism {
    Pessimistic,
    Moderate,
    Optimistic,
}

impl Optimism {
    /// Unknown codes fall back to `Moderate`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Pessimistic,
            3 => Self::Optimistic,
            _ => Self::Moderate,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Pessimistic => 1,
            Self::Moderate => 2,
            Self::Optimistic => 3,
        }
    }
}

/// A configured energy scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    /// Display name, used in chart titles.
    pub name: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Backend time step, e.g. `"PT1H"`.
    pub time_step: String,
    pub weather: Weather,
    pub consumption: Consumption,
    pub social_optimism: Optimism,
    pub ecological_optimism: Optimism,
}

impl Scenario {
    /// Check the invariants the backend relies on.
    pub fn validate(&self) -> CoreResult<()> {
        if self.end < self.start {
            return Err(CoreError::InvertedPeriod { id: self.id.get() });
        }
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidArg {
                what: "scenario name must not be empty",
            });
        }
        Ok(())
    }

    /// Length of the simulated period in hours.
    pub fn period_hours(&self) -> i64 {
        (self.end - self.start).num_hours()
    }
}
