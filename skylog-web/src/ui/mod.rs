//! HTML rendering for the SkyLog web interface
//!
//! Pages are plain server-rendered HTML with one shared stylesheet and a
//! single small script for browser geolocation.
//!
//! - **Search form** (`index`): landing page, location + optional date range
//! - **Result** (`result`): current conditions and daily rows for one lookup
//! - **History** (`history`): saved lookups with edit/delete/export actions
//! - **Edit** (`edit`): change a saved lookup's location, label or range

pub mod edit;
pub mod history;
pub mod index;
pub mod result;

use chrono::{DateTime, NaiveDate, Utc};
use skylog_common::time::format_date;

/// Values shown in the search form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFields {
    pub q: String,
    pub start: String,
    pub end: String,
}

/// Values shown in the edit form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditFields {
    pub id: i64,
    pub input_text: String,
    pub label: String,
    pub start: String,
    pub end: String,
}

impl EditFields {
    /// Prefill from a stored row
    pub fn from_query(query: &skylog_common::db::SearchQuery) -> Self {
        Self {
            id: query.id,
            input_text: query.input_text.clone(),
            label: query.label.clone().unwrap_or_default(),
            start: query.date_start.map(format_date).unwrap_or_default(),
            end: query.date_end.map(format_date).unwrap_or_default(),
        }
    }
}

/// Wrap page content in the shared document shell
pub fn layout(title: &str, content: &str) -> String {
    let git_hash = env!("GIT_HASH");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · SkyLog</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    <header>
        <div class="header-content">
            <a class="brand" href="/">SkyLog</a>
            <nav>
                <a href="/">Search</a>
                <a href="/history">History</a>
                <a href="/export/json">Export JSON</a>
                <a href="/export/csv">Export CSV</a>
            </nav>
        </div>
    </header>
    <main class="content">
{content}
    </main>
    <footer>skylog-web v{version} · {hash} ({profile})</footer>
</body>
</html>
"#,
        title = escape(title),
        content = content,
        version = env!("CARGO_PKG_VERSION"),
        hash = &git_hash[..git_hash.len().min(8)],
        profile = env!("BUILD_PROFILE"),
    )
}

/// Error banner, or nothing
pub fn error_banner(message: Option<&str>) -> String {
    match message {
        Some(msg) => format!(r#"<div class="error" role="alert">{}</div>"#, escape(msg)),
        None => String::new(),
    }
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Format an optional measurement, "—" when missing
pub fn number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "—".to_string(),
    }
}

/// `start → end`, or an empty string
pub fn date_range_text(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{} → {}", format_date(s), format_date(e)),
        (Some(s), None) => format!("from {}", format_date(s)),
        (None, Some(e)) => format!("until {}", format_date(e)),
        (None, None) => String::new(),
    }
}

/// Timestamp as shown in tables
pub fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape("São Paulo"), "São Paulo");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(Some(73.58), 1), "73.6");
        assert_eq!(number(Some(0.126), 2), "0.13");
        assert_eq!(number(None, 1), "—");
    }

    #[test]
    fn test_date_range_text() {
        let s = NaiveDate::from_ymd_opt(2025, 1, 1);
        let e = NaiveDate::from_ymd_opt(2025, 1, 5);
        assert_eq!(date_range_text(s, e), "2025-01-01 → 2025-01-05");
        assert_eq!(date_range_text(None, None), "");
    }

    #[test]
    fn test_layout_escapes_title() {
        let html = layout("<b>", "<p>body</p>");
        assert!(html.contains("<title>&lt;b&gt; · SkyLog</title>"));
        assert!(html.contains("<p>body</p>"));
    }
}
