//! Utility functions and helpers.

pub mod http;
pub mod url;

/// Collapse runs of whitespace into one space and trim both ends.
///
/// Idempotent: normalizing an already normalized string returns it unchanged.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
