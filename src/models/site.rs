// src/models/site.rs

//! Supported job boards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::url::get_domain;

/// A job-listing site with its own URL builder and scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Indeed,
    Monster,
    Jobly,
    Duunitori,
}

impl Site {
    /// Every supported site, in collection order.
    pub const ALL: [Site; 4] = [Site::Indeed, Site::Monster, Site::Jobly, Site::Duunitori];

    /// Name stamped on stored ads.
    pub fn name(&self) -> &'static str {
        match self {
            Site::Indeed => "indeed",
            Site::Monster => "monster",
            Site::Jobly => "jobly",
            Site::Duunitori => "duunitori",
        }
    }

    /// Host fragment every ad URL from this site contains.
    pub fn domain(&self) -> &'static str {
        match self {
            Site::Indeed => "indeed.fi",
            Site::Monster => "monster.fi",
            Site::Jobly => "jobly.fi",
            Site::Duunitori => "duunitori.fi",
        }
    }

    /// True if `url` is hosted on this site's domain or a subdomain of it.
    pub fn owns_url(&self, url: &str) -> bool {
        get_domain(url).is_some_and(|host| {
            host.strip_suffix(self.domain())
                .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('.'))
        })
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Site {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Site::ALL
            .iter()
            .copied()
            .find(|site| site.name() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown site '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_site_names() {
        for site in Site::ALL {
            assert_eq!(site.name().parse::<Site>().unwrap(), site);
        }
        assert_eq!("Duunitori".parse::<Site>().unwrap(), Site::Duunitori);
        assert!("oikotie".parse::<Site>().is_err());
    }

    #[test]
    fn test_owns_url_matches_host_suffix() {
        assert!(Site::Indeed.owns_url("http://www.indeed.fi/rc/clk?jk=1"));
        assert!(Site::Monster.owns_url("http://job-openings.monster.fi/x/1"));
        assert!(Site::Jobly.owns_url("https://JOBLY.fi/job-1"));
        assert!(!Site::Jobly.owns_url("https://site/job-99.html"));
        assert!(!Site::Jobly.owns_url("https://notjobly.fi/job-1"));
        assert!(!Site::Duunitori.owns_url("https://evil.example/?u=duunitori.fi"));
        assert!(!Site::Indeed.owns_url("not a url"));
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Site::Monster).unwrap();
        assert_eq!(json, "\"monster\"");
        let site: Site = serde_json::from_str("\"jobly\"").unwrap();
        assert_eq!(site, Site::Jobly);
    }
}
