// src/parsers/duunitori.rs

//! Scanner for Duunitori search results.
//!
//! Each result is one anchor; the title sits in an `h3` inside it and the
//! rest of the anchor's text becomes the description. The secondary section
//! after the list holds unrelated links and ends scanning.

use crate::models::Site;
use crate::parsers::markup::StartTag;
use crate::parsers::scanner::{AdAccumulator, MarkupScanner};
use crate::utils::url::{last_dash_segment, resolve};

pub const ORIGIN: &str = "http://www.duunitori.fi/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Idle,
    /// Inside a result anchor, before its title
    Ad,
    Title,
    /// Title closed, still inside the anchor
    AfterTitle,
    /// Past the result list
    ListDone,
}

pub struct DuunitoriScanner {
    state: State,
    ads: AdAccumulator,
}

impl DuunitoriScanner {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            ads: AdAccumulator::new(Site::Duunitori),
        }
    }
}

impl Default for DuunitoriScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupScanner for DuunitoriScanner {
    fn start_tag(&mut self, tag: &StartTag) {
        if self.state == State::ListDone {
            return;
        }

        if tag.is("section") && tag.has_class("section--secondary") {
            self.ads.discard();
            self.state = State::ListDone;
            return;
        }

        if tag.is("a") && tag.has_class("jobentry--item") {
            if self.state != State::Idle {
                self.ads.discard();
            }
            let href = tag.attr("href").unwrap_or_default().trim();
            let scratch = self.ads.scratch();
            scratch.url = resolve(ORIGIN, href);
            scratch.id = last_dash_segment(href).unwrap_or_default();
            self.state = State::Ad;
            return;
        }

        if self.state == State::Ad && tag.is("h3") && tag.attr("itemprop") == Some("title") {
            self.state = State::Title;
        }
    }

    fn end_tag(&mut self, name: &str) {
        match (self.state, name) {
            (State::Title, "h3") => self.state = State::AfterTitle,
            (State::AfterTitle, "a") => {
                self.ads.flush();
                self.state = State::Idle;
            }
            // Anchor closed before any title
            (State::Ad, "a") => {
                self.ads.discard();
                self.state = State::Idle;
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Title => self.ads.scratch().push_title(text),
            State::Ad | State::AfterTitle => self.ads.scratch().push_description(text),
            State::Idle | State::ListDone => {}
        }
    }

    fn accumulator(&mut self) -> &mut AdAccumulator {
        &mut self.ads
    }

    fn reset(&mut self) {
        self.state = State::Idle;
    }
}
