//! hq-core: stable foundation for the HarmoniQ dashboard.
//!
//! Contains:
//! - ids (scenario identity used as dependency and cache key)
//! - scenario (scenario model shared by the API layer and the panels)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod scenario;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use scenario::*;
