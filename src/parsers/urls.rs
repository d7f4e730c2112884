// src/parsers/urls.rs

//! Search URL builders, one per site.

use url::form_urlencoded::byte_serialize;

use crate::models::Site;

/// Form-encode a search term for a query string (space becomes `+`).
pub fn encode_term(term: &str) -> String {
    byte_serialize(term.as_bytes()).collect()
}

/// Indeed search, restricted to the Helsinki region.
pub fn indeed_url(term: &str) -> String {
    format!(
        "http://www.indeed.fi/jobs?as_and={}&as_phr=&as_any=&as_not=&as_ttl=&as_cmp=&jt=all&st=&radius=50&l=Helsinki&fromage=any&limit=50&sort=date&psf=advsrch",
        encode_term(term)
    )
}

pub fn monster_url(term: &str) -> String {
    format!(
        "http://hae.monster.fi/ty%C3%B6paikkoja/?q={}&cy=fi",
        encode_term(term)
    )
}

pub fn jobly_url(term: &str) -> String {
    format!("https://www.jobly.fi/tyopaikat?search={}", encode_term(term))
}

pub fn duunitori_url(term: &str) -> String {
    format!("http://duunitori.fi/tyopaikat/?haku={}&alue=", encode_term(term))
}

/// Search URL for `term` on `site`.
pub fn build_url(site: Site, term: &str) -> String {
    match site {
        Site::Indeed => indeed_url(term),
        Site::Monster => monster_url(term),
        Site::Jobly => jobly_url(term),
        Site::Duunitori => duunitori_url(term),
    }
}
