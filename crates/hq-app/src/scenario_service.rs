//! Scenario listing, lookup and summaries.

use hq_api::DashboardApi;
use hq_core::{Scenario, ScenarioId};
use tracing::warn;

use crate::error::{AppError, AppResult};

/// One row of the scenario list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub id: ScenarioId,
    pub name: String,
    pub start: String,
    pub end: String,
    pub hours: i64,
    pub weather: String,
}

impl From<&Scenario> for ScenarioSummary {
    fn from(s: &Scenario) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            start: s.start.format("%Y-%m-%d %H:%M").to_string(),
            end: s.end.format("%Y-%m-%d %H:%M").to_string(),
            hours: s.period_hours(),
            weather: format!("{:?}", s.weather),
        }
    }
}

/// Fetch every scenario, dropping records with an inverted period.
pub async fn fetch_scenarios(api: &dyn DashboardApi) -> AppResult<Vec<Scenario>> {
    let scenarios = api.list_scenarios().await?;
    Ok(scenarios
        .into_iter()
        .filter(|s| match s.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(scenario = %s.id, error = %e, "skipping scenario");
                false
            }
        })
        .collect())
}

/// Find a scenario by numeric id or by name (case-insensitive).
pub fn find_scenario(scenarios: &[Scenario], query: &str) -> AppResult<Scenario> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput("empty scenario query".to_string()));
    }

    let found = match query.parse::<u32>() {
        Ok(raw) => scenarios.iter().find(|s| s.id.get() == raw),
        Err(_) => scenarios
            .iter()
            .find(|s| s.name.to_lowercase() == query.to_lowercase()),
    };

    found
        .cloned()
        .ok_or_else(|| AppError::ScenarioNotFound(query.to_string()))
}

pub fn summarize(scenarios: &[Scenario]) -> Vec<ScenarioSummary> {
    scenarios.iter().map(ScenarioSummary::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hq_core::{Consumption, Optimism, Weather};

    fn scenario(id: u32, name: &str) -> Scenario {
        let start = NaiveDate::from_ymd_opt(2035, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Scenario {
            id: ScenarioId::new(id).unwrap(),
            name: name.to_string(),
            description: String::new(),
            start,
            end: start + chrono::Duration::hours(48),
            time_step: "PT1H".to_string(),
            weather: Weather::Cold,
            consumption: Consumption::Normal,
            social_optimism: Optimism::Moderate,
            ecological_optimism: Optimism::Moderate,
        }
    }

    #[test]
    fn find_by_id_or_name() {
        let all = vec![scenario(1, "Référence"), scenario(2, "Hiver froid")];
        assert_eq!(find_scenario(&all, "2").unwrap().name, "Hiver froid");
        assert_eq!(find_scenario(&all, "hiver FROID").unwrap().id.get(), 2);
        assert!(matches!(
            find_scenario(&all, "9"),
            Err(AppError::ScenarioNotFound(_))
        ));
        assert!(matches!(
            find_scenario(&all, "  "),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn summary_reports_period() {
        let summary = ScenarioSummary::from(&scenario(3, "x"));
        assert_eq!(summary.hours, 48);
        assert_eq!(summary.start, "2035-01-01 00:00");
        assert_eq!(summary.weather, "Cold");
    }
}
