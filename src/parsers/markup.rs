// src/parsers/markup.rs

//! Streaming HTML tokenization on top of the html5ever tokenizer.
//!
//! Produces start-tag, end-tag and text events in document order without
//! building a tree. Unlike a DOM parser it never synthesises end tags, so a
//! document cut off mid-ad leaves that ad open instead of closing it.

use std::cell::RefCell;
use std::mem;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token as Html5Token, TokenSink, TokenSinkResult,
    Tokenizer, TokenizerOpts,
};

/// A start tag with lower-cased name and attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub self_closing: bool,
}

impl StartTag {
    /// True if this is a `<name>` tag.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Value of the first attribute with the given name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// True if the class attribute contains `class` as one of its tokens.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|value| value.split_whitespace().any(|token| token == class))
    }
}

/// A tokenizer event. Text has character references decoded, except inside
/// `script` and `style`, whose bodies are passed through raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(StartTag),
    End(String),
    Text(String),
}

/// Body of these elements is not markup.
fn raw_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "title" | "textarea" => Some(RawKind::Rcdata),
        _ => None,
    }
}

/// Adapts html5ever tokens to [`Token`] events.
///
/// The tokenizer splits text at character references; adjacent pieces are
/// joined so each run of text between two tags arrives as one event.
struct EventSink<F> {
    on_token: RefCell<F>,
    text: RefCell<String>,
}

impl<F: FnMut(Token)> EventSink<F> {
    fn emit(&self, token: Token) {
        let mut on_token = self.on_token.borrow_mut();
        (&mut *on_token)(token);
    }

    fn flush_text(&self) {
        let text = mem::take(&mut *self.text.borrow_mut());
        if !text.is_empty() {
            self.emit(Token::Text(text));
        }
    }

    fn tag(&self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        match tag.kind {
            TagKind::EndTag => {
                self.emit(Token::End(name));
                TokenSinkResult::Continue
            }
            TagKind::StartTag => {
                let raw = if tag.self_closing { None } else { raw_kind(&name) };
                self.emit(Token::Start(StartTag {
                    attrs: tag
                        .attrs
                        .iter()
                        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                        .collect(),
                    self_closing: tag.self_closing,
                    name,
                }));
                match raw {
                    Some(kind) => TokenSinkResult::RawData(kind),
                    None => TokenSinkResult::Continue,
                }
            }
        }
    }
}

impl<F: FnMut(Token)> TokenSink for EventSink<F> {
    type Handle = ();

    fn process_token(&self, token: Html5Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Html5Token::CharacterTokens(text) => self.text.borrow_mut().push_str(&text),
            Html5Token::TagToken(tag) => {
                self.flush_text();
                return self.tag(tag);
            }
            Html5Token::CommentToken(_) | Html5Token::DoctypeToken(_) | Html5Token::EOFToken => {
                self.flush_text()
            }
            Html5Token::NullCharacterToken | Html5Token::ParseError(_) => {}
        }
        TokenSinkResult::Continue
    }
}

/// Tokenize `document`, calling `on_token` for each event in order.
///
/// A tag cut off by the end of input produces no event.
pub fn tokenize<F: FnMut(Token)>(document: &str, on_token: F) {
    let sink = EventSink {
        on_token: RefCell::new(on_token),
        text: RefCell::new(String::new()),
    };

    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(document));

    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let _ = tokenizer.feed(&input);
    tokenizer.end();
    tokenizer.sink.flush_text();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut out = Vec::new();
        tokenize(input, |token| out.push(token));
        out
    }

    fn start(name: &str, attrs: &[(&str, &str)]) -> Token {
        Token::Start(StartTag {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing: false,
        })
    }

    fn end(name: &str) -> Token {
        Token::End(name.to_string())
    }

    fn text(value: &str) -> Token {
        Token::Text(value.to_string())
    }

    #[test]
    fn test_simple_document() {
        assert_eq!(
            tokens(r#"<div class="a b"><a href='/x?y=1&amp;z=2'>Hi</a></div>"#),
            vec![
                start("div", &[("class", "a b")]),
                start("a", &[("href", "/x?y=1&z=2")]),
                text("Hi"),
                end("a"),
                end("div"),
            ]
        );
    }

    #[test]
    fn test_names_are_lowercased_and_unquoted_values_read() {
        assert_eq!(
            tokens("<H3 ItemProp=title data-id=42 hidden>T</H3>"),
            vec![
                start("h3", &[("itemprop", "title"), ("data-id", "42"), ("hidden", "")]),
                text("T"),
                end("h3"),
            ]
        );
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        assert_eq!(
            tokens("<!DOCTYPE html><!-- <a> --><p>x</p>"),
            vec![start("p", &[]), text("x"), end("p")]
        );
    }

    #[test]
    fn test_script_body_is_raw() {
        let doc = r#"<script type="application/ld+json">{"a":"<b>&amp;"}</script><b>x</b>"#;
        assert_eq!(
            tokens(doc),
            vec![
                start("script", &[("type", "application/ld+json")]),
                text(r#"{"a":"<b>&amp;"}"#),
                end("script"),
                start("b", &[]),
                text("x"),
                end("b"),
            ]
        );
    }

    #[test]
    fn test_self_closing_tag() {
        let toks = tokens("<br/><img src=x />");
        match &toks[0] {
            Token::Start(tag) => assert!(tag.self_closing && tag.is("br")),
            other => panic!("unexpected {other:?}"),
        }
        match &toks[1] {
            Token::Start(tag) => {
                assert!(tag.self_closing);
                assert_eq!(tag.attr("src"), Some("x"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_truncated_document_has_no_synthetic_end_tags() {
        let toks = tokens("<a class=\"x\"><h3>Title</h3> more <div class=\"cut");
        assert_eq!(
            toks,
            vec![
                start("a", &[("class", "x")]),
                start("h3", &[]),
                text("Title"),
                end("h3"),
                text(" more "),
            ]
        );
    }

    #[test]
    fn test_stray_less_than_is_text() {
        assert_eq!(
            tokens("<p>1 < 2</p>"),
            vec![start("p", &[]), text("1 < 2"), end("p")]
        );
    }

    #[test]
    fn test_character_references_decode_into_one_text_event() {
        assert_eq!(
            tokens("<p>M&uuml;ller &times; 2 &rarr; Jos&eacute; Ty&oumlpaikka &#228;&#xE4;</p>"),
            vec![
                start("p", &[]),
                text("Müller × 2 → José Työpaikka ää"),
                end("p"),
            ]
        );
        assert_eq!(
            tokens("&bogus; &"),
            vec![text("&bogus; &")]
        );
    }

    #[test]
    fn test_has_class_matches_tokens() {
        let tag = StartTag {
            name: "div".into(),
            attrs: vec![("class".into(), "row jobtitle  result".into())],
            self_closing: false,
        };
        assert!(tag.has_class("jobtitle"));
        assert!(!tag.has_class("job"));
    }
}
