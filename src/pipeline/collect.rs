// src/pipeline/collect.rs

//! Job ad collection pipeline.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{CancelFlag, CollectReport, Collector, DelayPolicy};
use crate::storage::JobStore;
use crate::utils::http::Fetcher;

/// Run one collection over `terms`, or the configured terms when empty.
pub async fn run_collect(
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn JobStore>,
    terms: &[String],
    cancel: CancelFlag,
) -> Result<CollectReport> {
    let start_time = Utc::now();
    let terms = if terms.is_empty() {
        config.search.terms.as_slice()
    } else {
        terms
    };

    log::info!(
        "Collecting {} terms from {} sites",
        terms.len(),
        config.search.sites.len()
    );

    let mut collector = Collector::new(fetcher, store, config.search.sites.clone())
        .with_delay(DelayPolicy::from_config(&config.collector))
        .with_cancel_flag(cancel);
    let report = collector.collect(terms).await?;

    report.log_summary();
    log::info!(
        "Collection took {}s",
        (Utc::now() - start_time).num_seconds()
    );
    Ok(report)
}
