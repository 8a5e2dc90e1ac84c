//! Backend contract consumed by the dashboard.
//!
//! Transports (HTTP, fixtures) implement [`DashboardApi`]. Futures are
//! local: the dashboard runs on a single-threaded executor.

use futures::future::LocalBoxFuture;
use hq_core::{Scenario, ScenarioId};

use crate::types::{SankeyDemand, TemporalDemand};
use crate::ApiResult;

pub trait DashboardApi {
    /// All scenarios known to the backend.
    fn list_scenarios(&self) -> LocalBoxFuture<'static, ApiResult<Vec<Scenario>>>;

    /// Hourly demand for a scenario.
    fn demand_temporal(&self, scenario: ScenarioId)
    -> LocalBoxFuture<'static, ApiResult<TemporalDemand>>;

    /// Per-sector energy demand for a scenario within region `mrc_id`.
    fn demand_sankey(
        &self,
        scenario: ScenarioId,
        mrc_id: u32,
    ) -> LocalBoxFuture<'static, ApiResult<SankeyDemand>>;
}
