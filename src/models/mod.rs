// src/models/mod.rs

//! Domain models for the collector.

mod config;
mod job_ad;
mod site;

// Re-export all public types
pub use config::{CollectorConfig, Config, SearchConfig, StorageConfig};
pub use job_ad::{Field, JobAd, Language};
pub use site::Site;
