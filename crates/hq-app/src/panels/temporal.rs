//! Hourly demand panel.

use std::rc::Rc;

use futures::FutureExt;
use hq_api::{DashboardApi, TemporalDemand};
use hq_core::ScenarioId;
use hq_viz::DataCache;

use crate::error::fetch_error;
use crate::plot::{Figure, Layout, Trace};

/// Demand series ready to plot, in MW.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalSeries {
    pub timestamps: Vec<String>,
    pub megawatts: Vec<f64>,
}

impl TemporalSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn peak(&self) -> Option<f64> {
        self.megawatts.iter().copied().reduce(f64::max)
    }
}

impl From<TemporalDemand> for TemporalSeries {
    fn from(demand: TemporalDemand) -> Self {
        // kWh per hour is an average power in kW.
        let (timestamps, megawatts) = demand
            .total_electricity
            .into_iter()
            .map(|(ts, kw)| (ts, kw / 1000.0))
            .unzip();
        Self {
            timestamps,
            megawatts,
        }
    }
}

pub type TemporalCache = DataCache<ScenarioId, TemporalSeries>;

pub fn temporal_cache(api: Rc<dyn DashboardApi>) -> TemporalCache {
    DataCache::new("demande-temporal", move |id: &ScenarioId| {
        api.demand_temporal(*id)
            .map(|result| result.map(TemporalSeries::from).map_err(fetch_error))
            .boxed_local()
    })
}

pub fn temporal_figure(series: &TemporalSeries, scenario_name: &str) -> Figure {
    Figure {
        traces: vec![Trace::Scatter {
            x: series.timestamps.clone(),
            y: series.megawatts.clone(),
            name: None,
            color: "blue".to_string(),
            spline: true,
        }],
        layout: Layout {
            title: format!("Demande pour scénario {}", scenario_name),
            x_title: Some("Date".to_string()),
            y_title: Some("Demande (MW)".to_string()),
            font_size: None,
        },
    }
}
