//! Service layer for the collector application.
//!
//! - Collection runs over terms and sites (`Collector`)
//! - Pacing between search terms (`DelayPolicy`)

mod collector;
mod delay;

pub use collector::{CancelFlag, CollectReport, Collector, FetchStatus, SiteOutcome};
pub use delay::DelayPolicy;
