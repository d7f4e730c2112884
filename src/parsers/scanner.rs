// src/parsers/scanner.rs

//! Scanner contract and the scratch record scanners build ads in.

use std::mem;

use crate::models::{Field, JobAd, Site};
use crate::parsers::markup::StartTag;
use crate::utils::normalize_whitespace;

/// Site-specific state machine fed by tokenizer events.
pub trait MarkupScanner: Send {
    fn start_tag(&mut self, tag: &StartTag);

    fn end_tag(&mut self, name: &str);

    fn text(&mut self, text: &str);

    /// Accumulator holding scratch and completed ads.
    fn accumulator(&mut self) -> &mut AdAccumulator;

    /// Return the state machine to its initial state.
    fn reset(&mut self);

    /// Called after the last token. An ad still open here is discarded.
    fn end_document(&mut self) {
        self.accumulator().discard();
        self.reset();
    }

    /// Take the ads completed so far.
    fn drain(&mut self) -> Vec<JobAd> {
        self.accumulator().drain()
    }
}

/// In-progress fields of the ad being scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScratchAd {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
}

impl ScratchAd {
    pub fn push_title(&mut self, text: &str) {
        push_text(&mut self.title, text);
    }

    pub fn push_description(&mut self, text: &str) {
        push_text(&mut self.description, text);
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.title.is_empty() && self.url.is_empty() && self.description.is_empty()
    }

    /// Normalize and check the parsed columns.
    ///
    /// Returns the missing columns when any of id, title, url or description is empty.
    pub fn finish(self) -> Result<JobAd, Vec<Field>> {
        let id = self.id.trim().to_string();
        let title = normalize_whitespace(&self.title);
        let url = self.url.trim().to_string();
        let description = normalize_whitespace(&self.description);

        let missing: Vec<Field> = Field::PARSED
            .into_iter()
            .zip([&id, &title, &url, &description])
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(JobAd {
            id: Some(id),
            title: Some(title),
            url: Some(url),
            description: Some(description),
            ..JobAd::default()
        })
    }
}

/// Text nodes are trimmed and joined with one space.
fn push_text(buffer: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    buffer.push_str(text);
}

/// Scratch ad plus the list of ads already flushed.
#[derive(Debug)]
pub struct AdAccumulator {
    site: Site,
    scratch: ScratchAd,
    completed: Vec<JobAd>,
    dropped: usize,
}

impl AdAccumulator {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            scratch: ScratchAd::default(),
            completed: Vec::new(),
            dropped: 0,
        }
    }

    pub fn scratch(&mut self) -> &mut ScratchAd {
        &mut self.scratch
    }

    /// Finalize the scratch ad.
    ///
    /// Incomplete ads, and ads whose url is not on the site's own domain, are
    /// dropped with a warning.
    pub fn flush(&mut self) -> bool {
        let scratch = mem::take(&mut self.scratch);
        match scratch.finish() {
            Ok(ad) => {
                let url = ad.url.as_deref().unwrap_or_default();
                if !self.site.owns_url(url) {
                    self.dropped += 1;
                    log::warn!(
                        "{}: dropping job ad with url outside {}: {}",
                        self.site,
                        self.site.domain(),
                        url
                    );
                    return false;
                }
                self.completed.push(ad);
                true
            }
            Err(missing) => {
                self.dropped += 1;
                let missing: Vec<&str> = missing.iter().map(Field::name).collect();
                log::warn!(
                    "{}: dropping incomplete job ad (missing {})",
                    self.site,
                    missing.join(", ")
                );
                false
            }
        }
    }

    /// Throw away the scratch ad without emitting it.
    pub fn discard(&mut self) {
        if !self.scratch.is_empty() {
            log::debug!("{}: discarding unfinished job ad", self.site);
        }
        self.scratch = ScratchAd::default();
    }

    pub fn drain(&mut self) -> Vec<JobAd> {
        mem::take(&mut self.completed)
    }

    /// Number of flushed ads rejected so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
