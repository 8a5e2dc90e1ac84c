//! Visualization lifecycle primitives for HarmoniQ chart panels.
//!
//! Every chart panel on the dashboard follows the same lifecycle: watch a
//! dependency (usually the selected scenario), fetch the data it needs,
//! and render only while the panel is actually on screen.
//!
//! # Architecture
//!
//! - [`Observable`] holds a dependency value and pushes changes synchronously
//! - [`DataCache`] memoizes fetches by dependency identity and is shared
//!   between panels
//! - [`VizController`] owns the lifecycle state machine of one panel and
//!   drives its [`RenderSink`]
//!
//! Everything runs on one thread. The only suspension point is the fetch;
//! stale results are discarded using a generation counter.

pub mod cache;
pub mod controller;
pub mod dependency;
pub mod error;
pub mod observable;
pub mod sink;
pub mod state;

pub use cache::{CacheStats, DataCache};
pub use controller::VizController;
pub use dependency::{Dependency, DependencyKey};
pub use error::{FetchError, FetchResult};
pub use observable::{Observable, Subscription};
pub use sink::{fn_sink, FnSink, RenderSink};
pub use state::LifecycleState;
