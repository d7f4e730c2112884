// src/parsers/monster.rs

//! Scanner for Monster search results.
//!
//! ```text
//! <div class="jobTitleContainer"><a href="..." name="id">title</a></div>
//! <div class="companyContainer">...company and location text...
//! <div class="companyLogo">                  <- flush
//! ```

use crate::models::Site;
use crate::parsers::markup::StartTag;
use crate::parsers::scanner::{AdAccumulator, MarkupScanner};
use crate::utils::url::resolve;

pub const ORIGIN: &str = "http://www.monster.fi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Idle,
    /// Inside the title container; `depth` counts open `div`s
    Title { depth: usize },
    /// Title container closed, waiting for the company container
    TitleDone,
    /// Collecting company text until the logo marker
    Description,
}

pub struct MonsterScanner {
    state: State,
    ads: AdAccumulator,
}

impl MonsterScanner {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            ads: AdAccumulator::new(Site::Monster),
        }
    }
}

impl Default for MonsterScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupScanner for MonsterScanner {
    fn start_tag(&mut self, tag: &StartTag) {
        if let State::Title { depth } = self.state {
            if tag.is("div") {
                self.state = State::Title { depth: depth + 1 };
            } else if tag.is("a") {
                let scratch = self.ads.scratch();
                if let Some(href) = tag.attr("href") {
                    scratch.url = resolve(ORIGIN, href.trim());
                }
                if let Some(name) = tag.attr("name") {
                    scratch.id = name.trim().to_string();
                }
            }
            return;
        }

        if !tag.is("div") {
            return;
        }

        if tag.has_class("jobTitleContainer") {
            if self.state != State::Idle {
                self.ads.discard();
            }
            self.state = State::Title { depth: 1 };
        } else if tag.has_class("companyContainer") && self.state == State::TitleDone {
            self.state = State::Description;
        } else if tag.has_class("companyLogo") && self.state == State::Description {
            self.ads.flush();
            self.state = State::Idle;
        }
    }

    fn end_tag(&mut self, name: &str) {
        if let State::Title { depth } = self.state {
            if name == "div" {
                self.state = if depth <= 1 {
                    State::TitleDone
                } else {
                    State::Title { depth: depth - 1 }
                };
            }
        }
    }

    fn text(&mut self, text: &str) {
        match self.state {
            State::Title { .. } => self.ads.scratch().push_title(text),
            State::Description => self.ads.scratch().push_description(text),
            State::Idle | State::TitleDone => {}
        }
    }

    fn accumulator(&mut self) -> &mut AdAccumulator {
        &mut self.ads
    }

    fn reset(&mut self) {
        self.state = State::Idle;
    }
}
