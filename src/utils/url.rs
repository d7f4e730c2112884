// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:\.[A-Za-z]+)?/?$").expect("valid regex"));

/// Resolve a potentially relative link against a site origin.
///
/// # Examples
/// ```
/// use jobads::utils::url::resolve;
///
/// assert_eq!(
///     resolve("http://www.indeed.fi", "/rc/clk?jk=1"),
///     "http://www.indeed.fi/rc/clk?jk=1"
/// );
/// ```
pub fn resolve(origin: &str, href: &str) -> String {
    // Already absolute
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = origin.split("://").next().unwrap_or("https");
        return format!("{scheme}://{rest}");
    }

    match (origin.ends_with('/'), href.starts_with('/')) {
        (true, true) => format!("{}{}", origin, &href[1..]),
        (false, false) => format!("{origin}/{href}"),
        _ => format!("{origin}{href}"),
    }
}

/// Extract the lower-cased host from a URL.
///
/// # Examples
/// ```
/// use jobads::utils::url::get_domain;
///
/// assert_eq!(
///     get_domain("https://www.Duunitori.fi/tyopaikat"),
///     Some("www.duunitori.fi".to_string())
/// );
/// ```
pub fn get_domain(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|host| host.to_lowercase()))
}

/// Extract the digit run at the end of a URL path (`.../job-99.html` gives `99`).
pub fn trailing_number(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    TRAILING_NUMBER
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Last `-`-delimited piece of a link path (`jobs/software-engineer-12345` gives `12345`).
pub fn last_dash_segment(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let segment = path.trim_end_matches('/').rsplit('-').next()?.trim();
    if segment.is_empty() || segment.contains('/') {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        assert_eq!(
            resolve("http://www.indeed.fi", "https://other.com/page"),
            "https://other.com/page"
        );
    }

    #[test]
    fn test_resolve_joins_slashes_once() {
        assert_eq!(
            resolve("http://www.indeed.fi", "/viewjob?jk=1"),
            "http://www.indeed.fi/viewjob?jk=1"
        );
        assert_eq!(
            resolve("http://www.duunitori.fi/", "tyopaikat/tyo/a-1"),
            "http://www.duunitori.fi/tyopaikat/tyo/a-1"
        );
        assert_eq!(
            resolve("http://www.duunitori.fi/", "/tyopaikat/tyo/a-1"),
            "http://www.duunitori.fi/tyopaikat/tyo/a-1"
        );
        assert_eq!(
            resolve("http://www.monster.fi", "job/1"),
            "http://www.monster.fi/job/1"
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve("http://www.monster.fi", "//job.monster.fi/1"),
            "http://job.monster.fi/1"
        );
    }

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("http://hae.monster.fi/x"),
            Some("hae.monster.fi".to_string())
        );
        assert_eq!(get_domain("invalid-url"), None);
    }

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("https://site/job-99.html"), Some("99".into()));
        assert_eq!(
            trailing_number("https://www.jobly.fi/tyopaikka/analyst-1234567?src=x"),
            Some("1234567".into())
        );
        assert_eq!(trailing_number("https://site/job/42/"), Some("42".into()));
        assert_eq!(trailing_number("https://site/job"), None);
    }

    #[test]
    fn test_last_dash_segment() {
        assert_eq!(
            last_dash_segment("jobs/software-engineer-12345"),
            Some("12345".into())
        );
        assert_eq!(
            last_dash_segment("tyopaikat/tyo/myyja-7788/?utm=1"),
            Some("7788".into())
        );
        assert_eq!(last_dash_segment("tyopaikat/tyo"), None);
    }
}
