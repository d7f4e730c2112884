//! Storage abstractions for job ad persistence.
//!
//! Ads are keyed by `(site, id)`. New ads are inserted once and never
//! overwritten by later collection runs; tagging and classification feed
//! back through the update operations.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Collector configuration
//! └── jobads.json           # Job store
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{JobAd, Language};

// Re-export for convenience
pub use local::LocalStorage;

/// Default file name of the job store.
pub const STORE_FILE: &str = "jobads.json";

/// On-disk layout of the job store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    /// Total ad count
    pub count: usize,
    /// The ads array
    pub ads: Vec<JobAd>,
}

impl StoreData {
    pub fn new(ads: Vec<JobAd>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: ads.len(),
            ads,
        }
    }
}

/// Filter for [`JobStore::get_ads`]. Every bound is optional; dates are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub language: Option<Language>,
    /// Only ads with a manual relevance tag
    pub classified_only: bool,
}

impl AdQuery {
    pub fn between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: Option<Language>) -> Self {
        self.language = language;
        self
    }

    pub fn classified(mut self, classified_only: bool) -> Self {
        self.classified_only = classified_only;
        self
    }

    /// True if `ad` passes every bound. Ads without a date fail any date bound.
    pub fn matches(&self, ad: &JobAd) -> bool {
        if self.start.is_some() || self.end.is_some() {
            let Some(date) = ad.date else {
                return false;
            };
            if self.start.is_some_and(|start| date < start)
                || self.end.is_some_and(|end| date > end)
            {
                return false;
            }
        }
        if self.language.is_some() && ad.language != self.language {
            return false;
        }
        !self.classified_only || ad.relevant.is_some()
    }
}

/// Model recommendation for one stored ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub site: String,
    pub id: String,
    pub recommendation: Option<u8>,
}

/// Detected language for one stored ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageUpdate {
    pub site: String,
    pub id: String,
    pub language: Option<Language>,
}

/// Trait for job store backends.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert ads whose `(site, id)` is not yet stored.
    ///
    /// Inserted rows get today's date and null language, relevance and
    /// recommendation. Returns the number of rows inserted.
    async fn store_ads(&self, ads: &[JobAd]) -> Result<usize>;

    /// Replace stored rows by key, inserting any that are missing.
    async fn update_ads(&self, ads: &[JobAd]) -> Result<usize>;

    async fn get_ads(&self, query: &AdQuery) -> Result<Vec<JobAd>>;

    /// Look up one ad by key.
    async fn get_ad(&self, site: &str, id: &str) -> Result<Option<JobAd>>;

    /// Set the recommendation column of existing rows.
    async fn update_recommendations(&self, updates: &[Recommendation]) -> Result<usize>;

    /// Set the language column of existing rows.
    async fn update_languages(&self, updates: &[LanguageUpdate]) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(date: Option<NaiveDate>) -> JobAd {
        JobAd {
            date,
            ..JobAd::default()
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 3, d).unwrap()
    }

    #[test]
    fn test_query_dates_are_inclusive() {
        let query = AdQuery::between(Some(day(2)), Some(day(4)));
        assert!(!query.matches(&dated(Some(day(1)))));
        assert!(query.matches(&dated(Some(day(2)))));
        assert!(query.matches(&dated(Some(day(4)))));
        assert!(!query.matches(&dated(Some(day(5)))));
        assert!(!query.matches(&dated(None)));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(AdQuery::default().matches(&JobAd::default()));
    }

    #[test]
    fn test_query_language_and_classified() {
        let query = AdQuery::default()
            .with_language(Some(Language::Finnish))
            .classified(true);

        let mut ad = JobAd {
            language: Some(Language::Finnish),
            ..JobAd::default()
        };
        assert!(!query.matches(&ad));
        ad.relevant = Some(0);
        assert!(query.matches(&ad));
        ad.language = Some(Language::English);
        assert!(!query.matches(&ad));
    }
}
