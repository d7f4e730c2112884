// src/services/collector.rs

//! Collection run over search terms and sites.
//!
//! Terms are processed one after another. For each term every configured
//! site is fetched and parsed with a fresh [`SiteParser`]; a site that fails
//! is logged and skipped, and the ads from the others are stamped and stored
//! before the next term starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;
use crate::models::{JobAd, Site};
use crate::parsers::SiteParser;
use crate::services::DelayPolicy;
use crate::storage::JobStore;
use crate::utils::http::Fetcher;

/// Shared flag that stops a run between terms.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// `dropped` counts ads rejected as incomplete or off-site
    Succeeded { ads: usize, dropped: usize },
    Failed { error: String },
}

/// Result of one `(term, site)` fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOutcome {
    pub site: Site,
    pub term: String,
    pub status: FetchStatus,
}

/// Summary of a collection run.
#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    pub outcomes: Vec<SiteOutcome>,
    /// Rows newly inserted into the store
    pub stored: usize,
    pub terms_completed: usize,
    pub cancelled: bool,
}

impl CollectReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FetchStatus::Succeeded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Ads parsed across all fetches, before deduplication by the store.
    pub fn total_ads(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                FetchStatus::Succeeded { ads, .. } => ads,
                FetchStatus::Failed { .. } => 0,
            })
            .sum()
    }

    /// Ads the parsers rejected across all fetches.
    pub fn total_dropped(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                FetchStatus::Succeeded { dropped, .. } => dropped,
                FetchStatus::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn log_summary(&self) {
        log::info!(
            "Collection {}: {} terms, {} fetches ok, {} failed, {} ads parsed, {} dropped, {} new",
            if self.cancelled { "cancelled" } else { "finished" },
            self.terms_completed,
            self.succeeded(),
            self.failed(),
            self.total_ads(),
            self.total_dropped(),
            self.stored
        );
        for outcome in &self.outcomes {
            if let FetchStatus::Failed { error } = &outcome.status {
                log::info!("    {} '{}': {}", outcome.site, outcome.term, error);
            }
        }
    }
}

/// Runs the fetch, parse and store loop.
pub struct Collector {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn JobStore>,
    sites: Vec<Site>,
    delay: DelayPolicy,
    cancel: CancelFlag,
}

impl Collector {
    /// Collector with no pause between terms and its own cancel flag.
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn JobStore>, sites: Vec<Site>) -> Self {
        Self {
            fetcher,
            store,
            sites,
            delay: DelayPolicy::none(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_delay(mut self, delay: DelayPolicy) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Collect ads for every term on every site.
    ///
    /// Transport failures are recorded in the report. Store failures abort
    /// the run with an error.
    pub async fn collect(&mut self, terms: &[String]) -> Result<CollectReport> {
        let mut report = CollectReport::default();

        for (index, term) in terms.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                let pause = self.delay.next_delay();
                log::debug!("Waiting {} ms before '{}'", pause.as_millis(), term);
                tokio::time::sleep(pause).await;
            }
            if self.cancel.is_cancelled() {
                log::warn!("Collection cancelled before term '{}'", term);
                report.cancelled = true;
                break;
            }

            log::info!("Searching '{}' ({}/{})", term, index + 1, terms.len());
            let batch = self.collect_term(term, &mut report).await;

            let stored = self.store.store_ads(&batch).await?;
            log::info!(
                "'{}': {} ads parsed, {} new stored",
                term,
                batch.len(),
                stored
            );
            report.stored += stored;
            report.terms_completed += 1;
        }

        Ok(report)
    }

    async fn collect_term(&self, term: &str, report: &mut CollectReport) -> Vec<JobAd> {
        let mut batch = Vec::new();

        for &site in &self.sites {
            let mut parser = SiteParser::new(site);
            let status = match parser.parse(self.fetcher.as_ref(), term).await {
                Ok(count) => {
                    let dropped = parser.dropped();
                    let mut ads = parser.into_job_ads();
                    for ad in &mut ads {
                        ad.stamp(site.name(), term);
                    }
                    batch.extend(ads);
                    FetchStatus::Succeeded {
                        ads: count,
                        dropped,
                    }
                }
                Err(e) => {
                    log::warn!("{}: search '{}' failed: {}", site, term, e);
                    FetchStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.outcomes.push(SiteOutcome {
                site,
                term: term.to_string(),
                status,
            });
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::storage::{AdQuery, LanguageUpdate, LocalStorage, Recommendation};
    use crate::utils::url::get_domain;

    const INDEED_DOC: &str = r#"
        <h2 class="jobtitle" id="jl_1"><a href="/rc/clk?jk=1">Analyst</a></h2>
        <span class="summary">Numbers</span>
        <div class="result-link-bar-container"></div>"#;

    const DUUNITORI_DOC: &str = r#"
        <a class="jobentry--item" href="/tyopaikat/tyo/analyytikko-55">
          <h3 itemprop="title">Analyytikko</h3><span>Firma Oy</span>
        </a>
        <a class="jobentry--item" href="/tyopaikat/tyo/kesatyo-56">
          <h3 itemprop="title">Kesätyö</h3>
        </a>"#;

    type Events = Arc<Mutex<Vec<String>>>;

    /// Serves canned documents by host; Monster always fails.
    struct StubFetcher {
        events: Events,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let host = get_domain(url).unwrap_or_default();
            self.events.lock().unwrap().push(format!("fetch {host}"));
            if host.ends_with("indeed.fi") {
                Ok(INDEED_DOC.to_string())
            } else if host.ends_with("duunitori.fi") {
                Ok(DUUNITORI_DOC.to_string())
            } else {
                Err(AppError::validation("connection reset"))
            }
        }
    }

    /// Records each stored batch in the shared event log.
    struct RecordingStore {
        events: Events,
        batches: Mutex<Vec<Vec<JobAd>>>,
        fail: bool,
    }

    #[async_trait]
    impl JobStore for RecordingStore {
        async fn store_ads(&self, ads: &[JobAd]) -> Result<usize> {
            if self.fail {
                return Err(AppError::Io(std::io::Error::other("disk full")));
            }
            self.events
                .lock()
                .unwrap()
                .push(format!("store {}", ads.len()));
            self.batches.lock().unwrap().push(ads.to_vec());
            Ok(ads.len())
        }

        async fn update_ads(&self, _ads: &[JobAd]) -> Result<usize> {
            Ok(0)
        }

        async fn get_ads(&self, _query: &AdQuery) -> Result<Vec<JobAd>> {
            Ok(Vec::new())
        }

        async fn get_ad(&self, _site: &str, _id: &str) -> Result<Option<JobAd>> {
            Ok(None)
        }

        async fn update_recommendations(&self, _updates: &[Recommendation]) -> Result<usize> {
            Ok(0)
        }

        async fn update_languages(&self, _updates: &[LanguageUpdate]) -> Result<usize> {
            Ok(0)
        }
    }

    fn setup(fail_store: bool) -> (Events, Arc<RecordingStore>, Collector) {
        let events: Events = Arc::default();
        let fetcher = Arc::new(StubFetcher {
            events: Arc::clone(&events),
        });
        let store = Arc::new(RecordingStore {
            events: Arc::clone(&events),
            batches: Mutex::default(),
            fail: fail_store,
        });
        let collector = Collector::new(
            fetcher,
            store.clone(),
            vec![Site::Indeed, Site::Monster, Site::Duunitori],
        );
        (events, store, collector)
    }

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failed_site_does_not_stop_the_term() {
        let (_, store, mut collector) = setup(false);
        let report = collector.collect(&terms(&["analyst"])).await.unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.total_ads(), 2);
        assert_eq!(report.total_dropped(), 1);
        assert_eq!(report.stored, 2);
        assert!(!report.cancelled);
        assert!(matches!(
            &report.outcomes[1],
            SiteOutcome { site: Site::Monster, status: FetchStatus::Failed { .. }, .. }
        ));
        assert_eq!(
            report.outcomes[2].status,
            FetchStatus::Succeeded { ads: 1, dropped: 1 }
        );

        let batches = store.batches.lock().unwrap();
        let sites: Vec<_> = batches[0].iter().map(|a| a.site.clone().unwrap()).collect();
        assert_eq!(sites, vec!["indeed", "duunitori"]);
        assert!(batches[0]
            .iter()
            .all(|a| a.searchterm.as_deref() == Some("analyst")));
    }

    #[tokio::test]
    async fn test_each_term_is_stored_before_the_next() {
        let (events, _, mut collector) = setup(false);
        collector.collect(&terms(&["a", "b"])).await.unwrap();

        let events = events.lock().unwrap();
        let stores: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with("store"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(stores, vec![3, 7]);
    }

    #[tokio::test]
    async fn test_cancel_stops_between_terms() {
        let (events, _, mut collector) = setup(false);
        collector.cancel_flag().cancel();

        let report = collector.collect(&terms(&["a", "b"])).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.terms_completed, 0);
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_error_is_propagated() {
        let (_, _, mut collector) = setup(true);
        let err = collector.collect(&terms(&["a"])).await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_terms() {
        let (_, _, collector) = setup(false);
        let mut collector = collector.with_delay(DelayPolicy::seeded(3000, 5000, 3));

        let start = tokio::time::Instant::now();
        collector.collect(&terms(&["only"])).await.unwrap();
        assert!(start.elapsed() < std::time::Duration::from_millis(3000));

        let start = tokio::time::Instant::now();
        collector.collect(&terms(&["one", "two"])).await.unwrap();
        assert!(start.elapsed() >= std::time::Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_collect_into_local_storage() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        let fetcher = Arc::new(StubFetcher {
            events: Arc::default(),
        });
        let mut collector = Collector::new(fetcher, storage.clone(), Site::ALL.to_vec());

        let first = collector.collect(&terms(&["analyst"])).await.unwrap();
        assert_eq!(first.stored, 2);

        // Same ads under a new term are already stored
        let second = collector.collect(&terms(&["data"])).await.unwrap();
        assert_eq!(second.stored, 0);

        let ads = storage.get_ads(&AdQuery::default()).await.unwrap();
        assert_eq!(ads.len(), 2);
        assert!(ads.iter().all(|a| a.searchterm.as_deref() == Some("analyst")));
    }
}
