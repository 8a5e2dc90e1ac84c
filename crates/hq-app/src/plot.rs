//! Plot model and the surface panels draw on.
//!
//! A [`Figure`] is a plain description of a chart (traces plus layout),
//! serializable so a front end can hand it to its plotting library as-is.
//! [`PlotSurface`] is the seam to that library: one call draws a figure into
//! a target element, one purges it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    /// Line series.
    Scatter {
        x: Vec<String>,
        y: Vec<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        color: String,
        spline: bool,
    },
    /// Flow diagram. `source`/`target` index into `labels`.
    Sankey {
        labels: Vec<String>,
        source: Vec<usize>,
        target: Vec<usize>,
        value: Vec<f64>,
        pad: u32,
        thickness: u32,
    },
}

impl Trace {
    pub fn kind(&self) -> &'static str {
        match self {
            Trace::Scatter { .. } => "scatter",
            Trace::Sankey { .. } => "sankey",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

/// Output surface hosting plots by target element id.
pub trait PlotSurface {
    /// Draw `figure` into `target`, replacing any plot already there.
    fn new_plot(&self, target: &str, figure: &Figure);

    /// Remove whatever is drawn in `target`.
    fn purge(&self, target: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Plot { target: String, figure: Figure },
    Purge { target: String },
}

#[derive(Debug, Default)]
struct Recording {
    events: Vec<SurfaceEvent>,
    active: BTreeMap<String, Figure>,
}

/// In-memory surface that keeps every call it receives.
///
/// Clones share the same log, so a test can keep one handle while the
/// dashboard owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.inner.borrow().events.clone()
    }

    /// Drain the event log, keeping the active plots.
    pub fn take_events(&self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.inner.borrow_mut().events)
    }

    pub fn is_active(&self, target: &str) -> bool {
        self.inner.borrow().active.contains_key(target)
    }

    /// Figure currently drawn in `target`.
    pub fn figure(&self, target: &str) -> Option<Figure> {
        self.inner.borrow().active.get(target).cloned()
    }

    pub fn active_targets(&self) -> Vec<String> {
        self.inner.borrow().active.keys().cloned().collect()
    }

    pub fn plot_count(&self, target: &str) -> usize {
        self.inner
            .borrow()
            .events
            .iter()
            .filter(|e| matches!(e, SurfaceEvent::Plot { target: t, .. } if t == target))
            .count()
    }
}

impl PlotSurface for RecordingSurface {
    fn new_plot(&self, target: &str, figure: &Figure) {
        debug!(target, traces = figure.traces.len(), "plot");
        let mut inner = self.inner.borrow_mut();
        inner.events.push(SurfaceEvent::Plot {
            target: target.to_string(),
            figure: figure.clone(),
        });
        inner.active.insert(target.to_string(), figure.clone());
    }

    fn purge(&self, target: &str) {
        debug!(target, "purge");
        let mut inner = self.inner.borrow_mut();
        inner.events.push(SurfaceEvent::Purge {
            target: target.to_string(),
        });
        inner.active.remove(target);
    }
}
