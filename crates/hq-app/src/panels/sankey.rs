//! Sector energy flow panel.

use std::rc::Rc;

use futures::FutureExt;
use hq_api::{DashboardApi, SankeyDemand};
use hq_core::ScenarioId;
use hq_viz::{DataCache, FetchError};

use crate::error::fetch_error;
use crate::plot::{Figure, Layout, Trace};

const ELECTRICITY: usize = 0;
const GAS: usize = 1;
const ENERGY_LABELS: [&str; 2] = ["Electricity", "Gaz"];

/// Flow diagram links: each energy source feeds every sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyFlows {
    pub labels: Vec<String>,
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<f64>,
}

impl SankeyFlows {
    pub fn sector_count(&self) -> usize {
        self.labels.len() - ENERGY_LABELS.len()
    }

    /// Energy delivered from `source` across all sectors.
    pub fn total_from(&self, source: usize) -> f64 {
        self.source
            .iter()
            .zip(&self.value)
            .filter(|(s, _)| **s == source)
            .map(|(_, v)| v)
            .sum()
    }
}

impl TryFrom<SankeyDemand> for SankeyFlows {
    type Error = FetchError;

    fn try_from(demand: SankeyDemand) -> Result<Self, Self::Error> {
        let sectors = demand.sector_labels();
        let n = sectors.len();
        if demand.total_electricity.len() != n || demand.total_gaz.len() != n {
            return Err(FetchError::decode(format!(
                "sankey demand has {} sectors but {} electricity and {} gas values",
                n,
                demand.total_electricity.len(),
                demand.total_gaz.len()
            )));
        }

        let mut labels: Vec<String> = ENERGY_LABELS.iter().map(|l| l.to_string()).collect();
        labels.extend(sectors.iter().map(|s| s.to_string()));

        let mut flows = SankeyFlows {
            labels,
            source: Vec::with_capacity(2 * n),
            target: Vec::with_capacity(2 * n),
            value: Vec::with_capacity(2 * n),
        };
        for i in 0..n {
            let sector = i + ENERGY_LABELS.len();
            flows.source.extend([ELECTRICITY, GAS]);
            flows.target.extend([sector, sector]);
            flows
                .value
                .extend([demand.total_electricity[i], demand.total_gaz[i]]);
        }
        Ok(flows)
    }
}

pub type SankeyCache = DataCache<ScenarioId, SankeyFlows>;

/// Cache over the sankey endpoint for region `mrc_id`.
pub fn sankey_cache(api: Rc<dyn DashboardApi>, mrc_id: u32) -> SankeyCache {
    DataCache::new("demande-sankey", move |id: &ScenarioId| {
        api.demand_sankey(*id, mrc_id)
            .map(|result| result.map_err(fetch_error).and_then(SankeyFlows::try_from))
            .boxed_local()
    })
}

pub fn sankey_figure(flows: &SankeyFlows, scenario_name: &str) -> Figure {
    Figure {
        traces: vec![Trace::Sankey {
            labels: flows.labels.clone(),
            source: flows.source.clone(),
            target: flows.target.clone(),
            value: flows.value.clone(),
            pad: 15,
            thickness: 20,
        }],
        layout: Layout {
            title: format!(
                "Flux d'énergie vers les secteurs pour scénario {}",
                scenario_name
            ),
            font_size: Some(10),
            ..Layout::default()
        },
    }
}
