// src/parsers/indeed.rs

//! Scanner for Indeed search results.
//!
//! ```text
//! <h2 class="jobtitle" id="..."><a href="/rc/clk?...">title</a></h2>
//! ...snippet text...
//! <div class="result-link-bar-container">   <- flush
//! ```

use crate::models::Site;
use crate::parsers::markup::StartTag;
use crate::parsers::scanner::{AdAccumulator, MarkupScanner};
use crate::utils::url::resolve;

pub const ORIGIN: &str = "http://www.indeed.fi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Idle,
    /// Inside the `h2.jobtitle` element
    Title,
    /// Title closed, collecting snippet text until the link bar
    Description,
}

pub struct IndeedScanner {
    state: State,
    ads: AdAccumulator,
}

impl IndeedScanner {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            ads: AdAccumulator::new(Site::Indeed),
        }
    }
}

impl Default for IndeedScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupScanner for IndeedScanner {
    fn start_tag(&mut self, tag: &StartTag) {
        if tag.is("h2") && tag.has_class("jobtitle") {
            if self.state != State::Idle {
                self.ads.discard();
            }
            self.ads.scratch().id = tag.attr("id").unwrap_or_default().to_string();
            self.state = State::Title;
            return;
        }

        match self.state {
            State::Title if tag.is("a") => {
                if let Some(href) = tag.attr("href") {
                    self.ads.scratch().url = resolve(ORIGIN, href.trim());
                }
            }
            State::Description
                if tag.is("div") && tag.has_class("result-link-bar-container") =>
            {
                self.ads.flush();
                self.state = State::Idle;
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, name: &str) {
        if self.state == State::Title && name == "h2" {
            self.state = State::Description;
        }
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Title => self.ads.scratch().push_title(text),
            State::Description => self.ads.scratch().push_description(text),
            State::Idle => {}
        }
    }

    fn accumulator(&mut self) -> &mut AdAccumulator {
        &mut self.ads
    }

    fn reset(&mut self) {
        self.state = State::Idle;
    }
}
