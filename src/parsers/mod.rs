// src/parsers/mod.rs

//! Site parsers.
//!
//! A [`SiteParser`] pairs a site's URL builder with its markup scanner.
//! Documents are cleaned, tokenized and streamed through the scanner, which
//! emits one [`JobAd`] per completed result block.
//!
//! ```text
//! term ─ build_url ─> fetch ─> clean_document ─> tokenize ─> MarkupScanner ─> Vec<JobAd>
//! ```

pub mod duunitori;
pub mod indeed;
pub mod jobly;
pub mod markup;
pub mod monster;
pub mod scanner;
pub mod urls;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{JobAd, Site};
use crate::utils::http::Fetcher;

pub use markup::{StartTag, Token, tokenize};
pub use scanner::{AdAccumulator, MarkupScanner, ScratchAd};
pub use urls::build_url;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NBSP_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:&nbsp;)+").expect("valid regex"));

/// Collapse whitespace runs and `&nbsp;` runs into a single space.
pub fn clean_document(document: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(document, " ");
    NBSP_RUN.replace_all(&collapsed, " ").into_owned()
}

/// Fresh scanner for a site, in its initial state.
pub fn scanner_for(site: Site) -> Box<dyn MarkupScanner> {
    match site {
        Site::Indeed => Box::new(indeed::IndeedScanner::new()),
        Site::Monster => Box::new(monster::MonsterScanner::new()),
        Site::Jobly => Box::new(jobly::JoblyScanner::new()),
        Site::Duunitori => Box::new(duunitori::DuunitoriScanner::new()),
    }
}

/// Parser for one site's search results.
pub struct SiteParser {
    site: Site,
    scanner: Box<dyn MarkupScanner>,
    job_ads: Vec<JobAd>,
    dropped: usize,
}

impl SiteParser {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            scanner: scanner_for(site),
            job_ads: Vec::new(),
            dropped: 0,
        }
    }

    pub fn site(&self) -> Site {
        self.site
    }

    /// Search URL for `term` on this parser's site.
    pub fn generate_url(&self, term: &str) -> String {
        build_url(self.site, term)
    }

    /// Fetch the results page for `term` and parse it.
    ///
    /// Returns the number of ads this page added. A fetch failure leaves the
    /// collected ads untouched and comes back as [`AppError::Transport`].
    pub async fn parse(&mut self, fetcher: &dyn Fetcher, term: &str) -> Result<usize> {
        let url = self.generate_url(term);
        log::debug!("{}: fetching {}", self.site, url);

        let document = fetcher
            .fetch(&url)
            .await
            .map_err(|e| AppError::transport(self.site.name(), &url, e))?;

        Ok(self.feed(&document))
    }

    /// Parse an already fetched document. Returns the number of ads added.
    pub fn feed(&mut self, document: &str) -> usize {
        let cleaned = clean_document(document);

        let scanner = &mut self.scanner;
        tokenize(&cleaned, |token| match token {
            Token::Start(tag) => scanner.start_tag(&tag),
            Token::End(name) => scanner.end_tag(&name),
            Token::Text(text) => scanner.text(&text),
        });
        self.scanner.end_document();
        self.dropped = self.scanner.accumulator().dropped();

        let ads = self.scanner.drain();
        let added = ads.len();
        if added == 0 && !cleaned.trim().is_empty() {
            log::warn!(
                "{}: no job ads found in a {} byte document; the page layout may have changed",
                self.site,
                document.len()
            );
        }
        self.job_ads.extend(ads);
        added
    }

    pub fn job_ads(&self) -> &[JobAd] {
        &self.job_ads
    }

    /// Ads rejected as incomplete or hosted off-site, across all documents fed.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_job_ads(self) -> Vec<JobAd> {
        self.job_ads
    }
}
