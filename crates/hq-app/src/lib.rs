//! hq-app: dashboard layer shared by front ends.
//!
//! Glues the backend contract (`hq-api`) to the visualization lifecycle
//! (`hq-viz`): configuration, the plot model, the chart panels and the
//! [`Dashboard`] that owns them.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod panels;
pub mod plot;
pub mod scenario_service;

pub use config::{load_config, parse_config, DashboardConfig, PanelTargets};
pub use dashboard::{Dashboard, DashboardCaches};
pub use error::{fetch_error, AppError, AppResult};
pub use panels::{PanelKind, PlotSink, SankeyFlows, TemporalSeries};
pub use plot::{Figure, Layout, PlotSurface, RecordingSurface, SurfaceEvent, Trace};
pub use scenario_service::{fetch_scenarios, find_scenario, summarize, ScenarioSummary};
