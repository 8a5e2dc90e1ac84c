//! Chart panels of the dashboard.
//!
//! Each panel is a [`VizController`](hq_viz::VizController) over the selected
//! scenario, backed by a shared cache and drawing through a [`PlotSink`].

pub mod sankey;
pub mod temporal;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use hq_core::Scenario;
use hq_viz::{Observable, RenderSink};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::plot::{Figure, PlotSurface};

pub use sankey::{sankey_cache, sankey_figure, SankeyCache, SankeyFlows};
pub use temporal::{temporal_cache, temporal_figure, TemporalCache, TemporalSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Temporal,
    Sankey,
}

impl PanelKind {
    pub const ALL: [PanelKind; 2] = [PanelKind::Temporal, PanelKind::Sankey];

    pub fn name(&self) -> &'static str {
        match self {
            PanelKind::Temporal => "temporal",
            PanelKind::Sankey => "sankey",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PanelKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temporal" => Ok(PanelKind::Temporal),
            "sankey" => Ok(PanelKind::Sankey),
            other => Err(AppError::UnknownPanel(other.to_string())),
        }
    }
}

/// Builds the figure for a payload, given the selected scenario's name.
pub type FigureBuilder<P> = fn(&P, &str) -> Figure;

/// Render sink drawing one panel into one target element of a surface.
pub struct PlotSink<P> {
    target: String,
    surface: Rc<dyn PlotSurface>,
    selection: Observable<Option<Scenario>>,
    figure_builder: FigureBuilder<P>,
}

impl<P> PlotSink<P> {
    pub fn new(
        target: impl Into<String>,
        surface: Rc<dyn PlotSurface>,
        selection: Observable<Option<Scenario>>,
        figure_builder: FigureBuilder<P>,
    ) -> Self {
        Self {
            target: target.into(),
            surface,
            selection,
            figure_builder,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl<P> RenderSink<P> for PlotSink<P> {
    fn generate_graph(&mut self, payload: &P) {
        let name = self
            .selection
            .with(|s| s.as_ref().map(|s| s.name.clone()))
            .unwrap_or_default();
        let figure = (self.figure_builder)(payload, &name);
        self.surface.new_plot(&self.target, &figure);
    }

    fn remove_graph(&mut self) {
        self.surface.purge(&self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Layout, RecordingSurface};

    fn titled(payload: &u32, name: &str) -> Figure {
        Figure {
            traces: Vec::new(),
            layout: Layout {
                title: format!("{} #{}", name, payload),
                ..Layout::default()
            },
        }
    }

    #[test]
    fn panel_names_parse() {
        for kind in PanelKind::ALL {
            assert_eq!(kind.name().parse::<PanelKind>().unwrap(), kind);
        }
        assert_eq!(" Sankey ".parse::<PanelKind>().unwrap(), PanelKind::Sankey);
        assert!(matches!(
            "map".parse::<PanelKind>(),
            Err(AppError::UnknownPanel(_))
        ));
    }

    #[test]
    fn sink_without_selection_uses_empty_name() {
        let surface = RecordingSurface::new();
        let mut sink = PlotSink::new("plot", Rc::new(surface.clone()), Observable::new(None), titled);

        sink.generate_graph(&7);
        assert_eq!(surface.figure("plot").unwrap().layout.title, " #7");

        sink.remove_graph();
        assert!(!surface.is_active("plot"));
    }
}
