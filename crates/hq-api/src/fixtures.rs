//! Directory-backed backend.
//!
//! Layout under the root directory:
//! - `scenarios.json`: array of backend scenario records
//! - `demande/temporal/<scenario id>.json`
//! - `demande/sankey/<scenario id>.json`

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use hq_core::{Scenario, ScenarioId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::DashboardApi;
use crate::types::{SankeyDemand, ScenarioDto, TemporalDemand};
use crate::{ApiError, ApiResult};

/// Number of requests served per endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub scenarios: u32,
    pub temporal: u32,
    pub sankey: u32,
}

#[derive(Default)]
struct Counters {
    scenarios: Cell<u32>,
    temporal: Cell<u32>,
    sankey: Cell<u32>,
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

#[derive(Clone)]
pub struct FixtureBackend {
    root_dir: PathBuf,
    counters: Rc<Counters>,
}

impl FixtureBackend {
    pub fn new(root_dir: PathBuf) -> ApiResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self {
            root_dir,
            counters: Rc::default(),
        })
    }

    /// Open an existing fixture directory without creating it.
    pub fn open(root_dir: &Path) -> ApiResult<Self> {
        if !root_dir.is_dir() {
            return Err(ApiError::InvalidPath {
                message: format!("{} is not a directory", root_dir.display()),
            });
        }
        Ok(Self {
            root_dir: root_dir.to_path_buf(),
            counters: Rc::default(),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn scenarios_path(&self) -> PathBuf {
        self.root_dir.join("scenarios.json")
    }

    fn demand_path(&self, kind: &str, id: ScenarioId) -> PathBuf {
        self.root_dir
            .join("demande")
            .join(kind)
            .join(format!("{}.json", id))
    }

    pub fn requests(&self) -> RequestCounts {
        RequestCounts {
            scenarios: self.counters.scenarios.get(),
            temporal: self.counters.temporal.get(),
            sankey: self.counters.sankey.get(),
        }
    }

    pub fn save_scenarios(&self, scenarios: &[Scenario]) -> ApiResult<()> {
        let records: Vec<ScenarioDto> = scenarios.iter().map(ScenarioDto::from).collect();
        write_json(&self.scenarios_path(), &records)
    }

    pub fn save_temporal(&self, id: ScenarioId, demand: &TemporalDemand) -> ApiResult<()> {
        write_json(&self.demand_path("temporal", id), demand)
    }

    pub fn save_sankey(&self, id: ScenarioId, demand: &SankeyDemand) -> ApiResult<()> {
        write_json(&self.demand_path("sankey", id), demand)
    }

    pub fn load_scenarios(&self) -> ApiResult<Vec<Scenario>> {
        let path = self.scenarios_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let records: Vec<ScenarioDto> = read_json(&path)?;
        let mut scenarios = Vec::with_capacity(records.len());
        for record in records {
            scenarios.push(Scenario::try_from(record)?);
        }
        Ok(scenarios)
    }

    pub fn load_temporal(&self, id: ScenarioId) -> ApiResult<TemporalDemand> {
        self.load_demand("temporal", id)
    }

    pub fn load_sankey(&self, id: ScenarioId) -> ApiResult<SankeyDemand> {
        self.load_demand("sankey", id)
    }

    fn load_demand<T: DeserializeOwned>(&self, kind: &str, id: ScenarioId) -> ApiResult<T> {
        let path = self.demand_path(kind, id);
        if !path.exists() {
            return Err(ApiError::ScenarioNotFound { id });
        }
        read_json(&path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ApiResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ApiResult<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

impl DashboardApi for FixtureBackend {
    fn list_scenarios(&self) -> LocalBoxFuture<'static, ApiResult<Vec<Scenario>>> {
        bump(&self.counters.scenarios);
        let backend = self.clone();
        async move { backend.load_scenarios() }.boxed_local()
    }

    fn demand_temporal(
        &self,
        scenario: ScenarioId,
    ) -> LocalBoxFuture<'static, ApiResult<TemporalDemand>> {
        bump(&self.counters.temporal);
        debug!(%scenario, "fixture temporal demand");
        let backend = self.clone();
        async move { backend.load_temporal(scenario) }.boxed_local()
    }

    fn demand_sankey(
        &self,
        scenario: ScenarioId,
        mrc_id: u32,
    ) -> LocalBoxFuture<'static, ApiResult<SankeyDemand>> {
        bump(&self.counters.sankey);
        debug!(%scenario, mrc_id, "fixture sankey demand");
        let backend = self.clone();
        async move { backend.load_sankey(scenario) }.boxed_local()
    }
}
