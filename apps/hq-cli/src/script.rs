//! Replay scripts: a scripted sequence of dashboard interactions.
//!
//! ```yaml
//! steps:
//!   - show: temporal
//!   - select: 1
//!   - select: Hiver froid
//!   - hide: temporal
//!   - show: sankey
//!   - retry: sankey
//!   - clear
//! ```

use std::path::Path;

use hq_app::{AppError, AppResult, PanelKind};
use serde::Deserialize;

/// Scenario reference by id or by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScenarioRef {
    Id(u32),
    Name(String),
}

impl ScenarioRef {
    pub fn query(&self) -> String {
        match self {
            ScenarioRef::Id(id) => id.to_string(),
            ScenarioRef::Name(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Select(ScenarioRef),
    Clear,
    Show(PanelKind),
    Hide(PanelKind),
    Retry(PanelKind),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    /// Steps are written as single-key maps (`show: temporal`) or bare
    /// names (`clear`) rather than YAML tags.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

pub fn load_script(path: &Path) -> AppResult<Script> {
    let content = std::fs::read_to_string(path)?;
    parse_script(&content)
}

pub fn parse_script(content: &str) -> AppResult<Script> {
    let script: Script = serde_yaml::from_str(content)
        .map_err(|e| AppError::InvalidInput(format!("Failed to parse replay script: {}", e)))?;
    if script.steps.is_empty() {
        return Err(AppError::InvalidInput(
            "replay script has no steps".to_string(),
        ));
    }
    Ok(script)
}
