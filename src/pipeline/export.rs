// src/pipeline/export.rs

//! Export stored ads as an HTML table or an Excel-style CSV file.

use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::models::JobAd;
use crate::storage::{AdQuery, JobStore};

const HEADERS: [&str; 9] = [
    "Search term",
    "Site",
    "Job title",
    "Description",
    "Date",
    "URL",
    "Language",
    "Relevant",
    "Recommendation",
];

const HTML_HEAD: &str = r#"<!DOCTYPE HTML><html><head>
<meta http-equiv="Content-Type" content="text/html; charset=UTF-8" />
<script type="text/javascript">function hideRow(rownumber)
{document.getElementById(rownumber).style.display='none';}
</script><link rel="stylesheet" href='jobsearch.css' />
</head><body><table>
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Html,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(AppError::validation(format!(
                "Unknown export format '{other}' (expected html or csv)"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Html => f.write_str("html"),
            ExportFormat::Csv => f.write_str("csv"),
        }
    }
}

/// Column values in export order; unset columns are empty.
fn row(ad: &JobAd) -> [String; 9] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let flag = |value: Option<u8>| value.map(|v| v.to_string()).unwrap_or_default();
    [
        text(&ad.searchterm),
        text(&ad.site),
        text(&ad.title),
        text(&ad.description),
        ad.date.map(|d| d.to_string()).unwrap_or_default(),
        text(&ad.url),
        ad.language.map(|l| l.to_string()).unwrap_or_default(),
        flag(ad.relevant),
        flag(ad.recommendation),
    ]
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(out: &mut String, fields: impl IntoIterator<Item = impl AsRef<str>>) {
    let line: Vec<String> = fields
        .into_iter()
        .map(|field| csv_field(field.as_ref()))
        .collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// CSV with a header row and CRLF line endings.
pub fn render_csv(ads: &[JobAd]) -> String {
    let mut out = String::new();
    csv_line(&mut out, HEADERS);
    for ad in ads {
        csv_line(&mut out, row(ad));
    }
    out
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Standalone HTML page with one table row per ad and a hide button per row.
pub fn render_html(ads: &[JobAd]) -> String {
    let classes = [
        "searchterm",
        "site",
        "jobtitle",
        "description",
        "date",
        "url",
        "language",
        "relevant",
        "recommendation",
    ];

    let mut out = String::from(HTML_HEAD);
    out.push_str("<tr class=\"headers\">");
    for (class, header) in classes.iter().zip(HEADERS) {
        let _ = write!(out, "<th class=\"{class}\">{header}</th>");
    }
    out.push_str("<th></th></tr>\n");

    for (number, ad) in ads.iter().enumerate() {
        let cells = row(ad).map(|cell| escape_html(&cell));
        let _ = write!(
            out,
            "<tr class=\"{}\" origsite=\"{}\" id=\"{number}\">",
            cells[0], cells[1]
        );
        for (class, cell) in classes.iter().zip(&cells) {
            if *class == "url" {
                let _ = write!(out, "<td class=\"url\"><a href=\"{cell}\">Link</a></td>");
            } else {
                let _ = write!(out, "<td class=\"{class}\">{cell}</td>");
            }
        }
        let _ = writeln!(
            out,
            "<td class=\"hidebutton\"><input type=\"button\" value=\"Hide\" onclick='hideRow(\"{number}\");' /></td></tr>"
        );
    }

    out.push_str("</table></body></html>\n");
    out
}

/// Write the ads matching `query` to `path`. Returns the number of ads written.
pub async fn run_export(
    store: &dyn JobStore,
    query: &AdQuery,
    path: &Path,
    format: ExportFormat,
) -> Result<usize> {
    let ads = store.get_ads(query).await?;
    let body = match format {
        ExportFormat::Html => render_html(&ads),
        ExportFormat::Csv => render_csv(&ads),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await?;

    log::info!("Exported {} ads as {} to {}", ads.len(), format, path.display());
    Ok(ads.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::storage::LocalStorage;
    use chrono::NaiveDate;

    fn sample() -> JobAd {
        JobAd {
            site: Some("indeed".into()),
            searchterm: Some("analyst".into()),
            id: Some("1".into()),
            title: Some("Analyst, \"senior\"".into()),
            url: Some("http://www.indeed.fi/rc/clk?jk=1&from=x".into()),
            description: Some("Data <and> reports".into()),
            date: NaiveDate::from_ymd_opt(2016, 2, 29),
            language: Some(Language::English),
            relevant: Some(1),
            recommendation: None,
        }
    }

    #[test]
    fn test_render_csv() {
        let csv = render_csv(&[sample()]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "Search term,Site,Job title,Description,Date,URL,Language,Relevant,Recommendation"
        );
        assert_eq!(
            lines[1],
            "analyst,indeed,\"Analyst, \"\"senior\"\"\",Data <and> reports,2016-02-29,http://www.indeed.fi/rc/clk?jk=1&from=x,English,1,"
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_render_html_escapes() {
        let html = render_html(&[sample()]);
        assert!(html.contains("<th class=\"jobtitle\">Job title</th>"));
        assert!(html.contains("<tr class=\"analyst\" origsite=\"indeed\" id=\"0\">"));
        assert!(html.contains("<td class=\"description\">Data &lt;and&gt; reports</td>"));
        assert!(html.contains("<a href=\"http://www.indeed.fi/rc/clk?jk=1&amp;from=x\">Link</a>"));
        assert!(html.contains("<td class=\"recommendation\"></td>"));
        assert!(html.ends_with("</table></body></html>\n"));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[tokio::test]
    async fn test_run_export_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.store_ads(&[sample()]).await.unwrap();

        let path = tmp.path().join("out").join("ads.csv");
        let written = run_export(&storage, &AdQuery::default(), &path, ExportFormat::Csv)
            .await
            .unwrap();
        assert_eq!(written, 1);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Search term,"));
        assert_eq!(content.lines().count(), 2);
    }
}
