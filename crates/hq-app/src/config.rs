//! Dashboard configuration.
//!
//! Loaded from YAML:
//!
//! ```yaml
//! fixtures_dir: ./fixtures
//! mrc_id: 1
//! panels:
//!   temporal: temporal-demande-production
//!   sankey: sector-energy-cons-sankey
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Plot element ids the panels draw into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelTargets {
    pub temporal: String,
    pub sankey: String,
}

impl Default for PanelTargets {
    fn default() -> Self {
        Self {
            temporal: "temporal-demande-production".to_string(),
            sankey: "sector-energy-cons-sankey".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory served by the fixture backend.
    pub fixtures_dir: Option<PathBuf>,
    /// Regional unit passed to the sankey endpoint.
    pub mrc_id: u32,
    pub panels: PanelTargets,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: None,
            mrc_id: 1,
            panels: PanelTargets::default(),
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.mrc_id == 0 {
            return Err(AppError::Validation("mrc_id must be positive".to_string()));
        }
        let targets = [&self.panels.temporal, &self.panels.sankey];
        if targets.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::Validation(
                "panel targets must not be empty".to_string(),
            ));
        }
        if self.panels.temporal == self.panels.sankey {
            return Err(AppError::Validation(format!(
                "panels share the plot target '{}'",
                self.panels.temporal
            )));
        }
        Ok(())
    }

    /// Fixture directory, resolved against `base` when relative.
    pub fn resolved_fixtures_dir(&self, base: &Path) -> Option<PathBuf> {
        self.fixtures_dir.as_ref().map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                base.join(dir)
            }
        })
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> AppResult<DashboardConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config = parse_config(&content)?;

    // Relative fixture paths are relative to the config file.
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(DashboardConfig {
        fixtures_dir: config.resolved_fixtures_dir(base),
        ..config
    })
}

/// Parse and validate config YAML.
pub fn parse_config(content: &str) -> AppResult<DashboardConfig> {
    let config: DashboardConfig = serde_yaml::from_str(content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = parse_config("mrc_id: 3\n").unwrap();
        assert_eq!(config.mrc_id, 3);
        assert_eq!(config.panels, PanelTargets::default());
        assert!(config.fixtures_dir.is_none());
    }

    #[test]
    fn rejects_shared_targets() {
        let yaml = "panels:\n  temporal: plot\n  sankey: plot\n";
        assert!(matches!(parse_config(yaml), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_zero_mrc() {
        assert!(matches!(
            parse_config("mrc_id: 0"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn relative_fixtures_resolve_against_config_dir() {
        let dir = std::env::temp_dir().join("hq_app_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dashboard.yaml");
        std::fs::write(&path, "fixtures_dir: data\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.fixtures_dir, Some(dir.join("data")));
    }
}
