//! Dashboard wiring: the scenario selection, the shared caches and one
//! controller per panel.

use std::rc::Rc;

use futures::task::LocalSpawn;
use hq_api::DashboardApi;
use hq_core::Scenario;
use hq_viz::{LifecycleState, Observable, Subscription, VizController};
use tracing::info;

use crate::config::DashboardConfig;
use crate::panels::{
    sankey_cache, sankey_figure, temporal_cache, temporal_figure, PanelKind, PlotSink,
    SankeyCache, SankeyFlows, TemporalCache, TemporalSeries,
};
use crate::plot::PlotSurface;

/// Payload caches, shareable between several dashboards.
#[derive(Debug, Clone)]
pub struct DashboardCaches {
    pub temporal: TemporalCache,
    pub sankey: SankeyCache,
}

impl DashboardCaches {
    pub fn new(api: Rc<dyn DashboardApi>, mrc_id: u32) -> Self {
        Self {
            temporal: temporal_cache(Rc::clone(&api)),
            sankey: sankey_cache(api, mrc_id),
        }
    }

    pub fn clear(&self) {
        self.temporal.clear();
        self.sankey.clear();
    }
}

pub struct Dashboard {
    selected: Observable<Option<Scenario>>,
    caches: DashboardCaches,
    temporal: VizController<Scenario, TemporalSeries>,
    sankey: VizController<Scenario, SankeyFlows>,
}

impl Dashboard {
    /// Build both panels, hidden and with nothing selected.
    pub fn new<Sp>(
        config: &DashboardConfig,
        caches: DashboardCaches,
        surface: Rc<dyn PlotSurface>,
        spawner: Sp,
    ) -> Self
    where
        Sp: LocalSpawn + Clone + 'static,
    {
        let selected: Observable<Option<Scenario>> = Observable::new(None);

        let temporal = VizController::new(
            PanelKind::Temporal.name(),
            &selected,
            caches.temporal.source::<Scenario>(),
            PlotSink::new(
                config.panels.temporal.clone(),
                Rc::clone(&surface),
                selected.clone(),
                temporal_figure,
            ),
            spawner.clone(),
        );
        let sankey = VizController::new(
            PanelKind::Sankey.name(),
            &selected,
            caches.sankey.source::<Scenario>(),
            PlotSink::new(
                config.panels.sankey.clone(),
                surface,
                selected.clone(),
                sankey_figure,
            ),
            spawner,
        );

        Self {
            selected,
            caches,
            temporal,
            sankey,
        }
    }

    /// Change the selected scenario. Returns whether the selection changed.
    pub fn select(&self, scenario: Option<Scenario>) -> bool {
        match &scenario {
            Some(s) => info!(scenario = %s.id, name = %s.name, "select"),
            None => info!("clear selection"),
        }
        self.selected.set(scenario)
    }

    pub fn selected(&self) -> Option<Scenario> {
        self.selected.get()
    }

    /// The selection cell, for views that react to it directly.
    pub fn selection(&self) -> &Observable<Option<Scenario>> {
        &self.selected
    }

    pub fn caches(&self) -> &DashboardCaches {
        &self.caches
    }

    pub fn show(&self, panel: PanelKind) {
        match panel {
            PanelKind::Temporal => self.temporal.display(),
            PanelKind::Sankey => self.sankey.display(),
        }
    }

    pub fn hide(&self, panel: PanelKind) {
        match panel {
            PanelKind::Temporal => self.temporal.undisplay(),
            PanelKind::Sankey => self.sankey.undisplay(),
        }
    }

    pub fn panel_state(&self, panel: PanelKind) -> LifecycleState {
        match panel {
            PanelKind::Temporal => self.temporal.state(),
            PanelKind::Sankey => self.sankey.state(),
        }
    }

    pub fn is_shown(&self, panel: PanelKind) -> bool {
        match panel {
            PanelKind::Temporal => self.temporal.is_displayed(),
            PanelKind::Sankey => self.sankey.is_displayed(),
        }
    }

    pub fn is_rendered(&self, panel: PanelKind) -> bool {
        match panel {
            PanelKind::Temporal => self.temporal.is_rendered(),
            PanelKind::Sankey => self.sankey.is_rendered(),
        }
    }

    /// Re-run a failed panel's fetch.
    pub fn retry(&self, panel: PanelKind) -> bool {
        match panel {
            PanelKind::Temporal => self.temporal.retry(),
            PanelKind::Sankey => self.sankey.retry(),
        }
    }

    pub fn subscribe_panel(
        &self,
        panel: PanelKind,
        listener: impl Fn(&LifecycleState) + 'static,
    ) -> Subscription {
        match panel {
            PanelKind::Temporal => self.temporal.subscribe_state(listener),
            PanelKind::Sankey => self.sankey.subscribe_state(listener),
        }
    }

    /// Detach both panels from the selection and clear what they drew.
    pub fn shutdown(&self) {
        self.temporal.dispose();
        self.sankey.dispose();
    }
}
