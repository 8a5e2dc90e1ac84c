//! Wire data types.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use hq_core::{Consumption, CoreError, Optimism, Scenario, ScenarioId, Weather};
use serde::{Deserialize, Serialize};

/// Scenario record as emitted by the backend (numeric enum codes, French
/// field names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDto {
    pub id: i64,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "date_de_debut")]
    pub start: NaiveDateTime,
    #[serde(rename = "date_de_fin")]
    pub end: NaiveDateTime,
    #[serde(rename = "pas_de_temps")]
    pub time_step: String,
    pub weather: i64,
    #[serde(rename = "consomation")]
    pub consumption: i64,
    #[serde(rename = "optimisme_social")]
    pub social_optimism: i64,
    #[serde(rename = "optimisme_ecologique")]
    pub ecological_optimism: i64,
}

impl TryFrom<ScenarioDto> for Scenario {
    type Error = CoreError;

    fn try_from(dto: ScenarioDto) -> Result<Self, Self::Error> {
        Ok(Scenario {
            id: ScenarioId::try_from(dto.id)?,
            name: dto.name,
            description: dto.description,
            start: dto.start,
            end: dto.end,
            time_step: dto.time_step,
            weather: Weather::from_code(dto.weather),
            consumption: Consumption::from_code(dto.consumption),
            social_optimism: Optimism::from_code(dto.social_optimism),
            ecological_optimism: Optimism::from_code(dto.ecological_optimism),
        })
    }
}

impl From<&Scenario> for ScenarioDto {
    fn from(s: &Scenario) -> Self {
        ScenarioDto {
            id: i64::from(s.id.get()),
            name: s.name.clone(),
            description: s.description.clone(),
            start: s.start,
            end: s.end,
            time_step: s.time_step.clone(),
            weather: s.weather.code(),
            consumption: s.consumption.code(),
            social_optimism: s.social_optimism.code(),
            ecological_optimism: s.ecological_optimism.code(),
        }
    }
}

/// Hourly demand of a scenario, `POST /demande/temporal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalDemand {
    /// Electricity demand in kWh keyed by timestamp.
    pub total_electricity: BTreeMap<String, f64>,
}

/// Energy delivered per consumption sector, `POST /demande/sankey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyDemand {
    /// Sector labels keyed by position.
    pub sector: BTreeMap<u32, String>,
    /// Electricity per sector, in sector order.
    pub total_electricity: Vec<f64>,
    /// Gas per sector, in sector order.
    pub total_gaz: Vec<f64>,
}

impl SankeyDemand {
    /// Sector labels in position order.
    pub fn sector_labels(&self) -> Vec<&str> {
        self.sector.values().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_dto_decodes_backend_json() {
        let json = r#"{
            "id": 3,
            "nom": "Hiver froid",
            "description": "pointe",
            "date_de_debut": "2035-01-01T00:00:00",
            "date_de_fin": "2035-01-08T00:00:00",
            "pas_de_temps": "PT1H",
            "weather": 3,
            "consomation": 1,
            "optimisme_social": 2,
            "optimisme_ecologique": 3
        }"#;
        let dto: ScenarioDto = serde_json::from_str(json).unwrap();
        let scenario = Scenario::try_from(dto).unwrap();
        assert_eq!(scenario.id.get(), 3);
        assert_eq!(scenario.name, "Hiver froid");
        assert_eq!(scenario.weather, Weather::Cold);
        assert_eq!(scenario.consumption, Consumption::Normal);
        assert_eq!(scenario.ecological_optimism, Optimism::Optimistic);
        assert_eq!(scenario.period_hours(), 7 * 24);

        let back = ScenarioDto::from(&scenario);
        assert_eq!(back.id, 3);
        assert_eq!(back.weather, 3);
    }

    #[test]
    fn zero_id_is_rejected() {
        let dto = ScenarioDto {
            id: 0,
            name: "x".into(),
            description: String::new(),
            start: NaiveDateTime::default(),
            end: NaiveDateTime::default(),
            time_step: "PT1H".into(),
            weather: 1,
            consumption: 1,
            social_optimism: 1,
            ecological_optimism: 1,
        };
        assert!(Scenario::try_from(dto).is_err());
    }

    #[test]
    fn sankey_sectors_sort_numerically() {
        let json = r#"{
            "sector": {"10": "K", "2": "C", "0": "A", "1": "B"},
            "total_electricity": [1, 2, 3, 4],
            "total_gaz": [0, 0, 0, 0]
        }"#;
        let demand: SankeyDemand = serde_json::from_str(json).unwrap();
        assert_eq!(demand.sector_labels(), vec!["A", "B", "C", "K"]);
    }
}
