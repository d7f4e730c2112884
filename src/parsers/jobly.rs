// src/parsers/jobly.rs

//! Scanner for Jobly search results.
//!
//! Jobly embeds each listing as schema.org JSON-LD:
//!
//! ```text
//! <script type="application/ld+json">{"@type": "JobPosting", "title": ..., "url": ...}</script>
//! ```
//!
//! Other JSON-LD blocks on the page (breadcrumbs, organization) are ignored.

use scraper::Html;
use serde_json::{Map, Value};

use crate::models::Site;
use crate::parsers::markup::StartTag;
use crate::parsers::scanner::{AdAccumulator, MarkupScanner};
use crate::utils::url::{resolve, trailing_number};

pub const ORIGIN: &str = "https://www.jobly.fi";

const JSON_LD: &str = "application/ld+json";
const JOB_POSTING: &str = "JobPosting";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Idle,
    /// Inside a JSON-LD script element
    JsonLd,
}

pub struct JoblyScanner {
    state: State,
    payload: String,
    ads: AdAccumulator,
}

impl JoblyScanner {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            payload: String::new(),
            ads: AdAccumulator::new(Site::Jobly),
        }
    }

    fn emit_postings(&mut self) {
        let payload = std::mem::take(&mut self.payload);
        let value: Value = match serde_json::from_str(payload.trim()) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("{}: skipping unreadable JSON-LD block: {}", Site::Jobly, e);
                return;
            }
        };

        let mut postings = Vec::new();
        collect_postings(&value, &mut postings);

        for posting in postings {
            let scratch = self.ads.scratch();
            let url = string_field(posting, "url")
                .map(|url| resolve(ORIGIN, url.trim()))
                .unwrap_or_default();
            scratch.id = trailing_number(&url).unwrap_or_default();
            scratch.url = url;
            if let Some(title) = string_field(posting, "title") {
                scratch.push_title(title);
            }
            if let Some(description) = string_field(posting, "description") {
                scratch.push_description(&strip_markup(description));
            }
            self.ads.flush();
        }
    }
}

impl Default for JoblyScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupScanner for JoblyScanner {
    fn start_tag(&mut self, tag: &StartTag) {
        let is_json_ld = tag.is("script")
            && tag
                .attr("type")
                .is_some_and(|kind| kind.trim().eq_ignore_ascii_case(JSON_LD));
        if is_json_ld {
            self.payload.clear();
            self.state = State::JsonLd;
        }
    }

    fn end_tag(&mut self, name: &str) {
        if self.state == State::JsonLd && name == "script" {
            self.emit_postings();
            self.state = State::Idle;
        }
    }

    fn text(&mut self, text: &str) {
        if self.state == State::JsonLd {
            self.payload.push_str(text);
        }
    }

    fn accumulator(&mut self) -> &mut AdAccumulator {
        &mut self.ads
    }

    fn reset(&mut self) {
        self.payload.clear();
        self.state = State::Idle;
    }
}

/// Gather every `JobPosting` object from a JSON-LD value, including `@graph` members.
fn collect_postings<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_postings(item, out);
            }
        }
        Value::Object(map) => {
            if is_job_posting(map) {
                out.push(map);
            }
            if let Some(graph) = map.get("@graph") {
                collect_postings(graph, out);
            }
        }
        _ => {}
    }
}

fn is_job_posting(map: &Map<String, Value>) -> bool {
    match map.get("@type") {
        Some(Value::String(kind)) => kind == JOB_POSTING,
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some(JOB_POSTING)),
        _ => false,
    }
}

fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Descriptions are often HTML fragments; keep only their text.
fn strip_markup(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return fragment.to_string();
    }
    let html = Html::parse_fragment(fragment);
    html.root_element().text().collect::<Vec<_>>().join(" ")
}
