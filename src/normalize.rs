use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::{entry::Entry, remote::RemoteRecord};

static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+$").expect("static regex"));

/// Map a remote record onto an [`Entry`]. Never fails.
///
/// - a missing or blank title falls back to the url
/// - `ogdate` wins over `created` when it parses; if neither parses the date is `None`
pub fn normalize(record: RemoteRecord) -> Entry {
    let url = record.link.trim().to_string();

    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(String::from)
        .unwrap_or_else(|| url.clone());

    let date = non_empty(record.ogdate.as_deref())
        .and_then(parse_date)
        .or_else(|| non_empty(record.created.as_deref()).and_then(parse_date));

    Entry { url, title, date }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Best-effort date parsing. Accepts RFC 3339, PocketBase's
/// `YYYY-MM-DD HH:MM:SS.fffZ`, RFC 2822 mail dates and bare `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    // PocketBase
    let stripped = value.strip_suffix('Z').unwrap_or(value);
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(stripped, format) {
            return Some(date.and_utc());
        }
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }

    // mail clients like to append "(UTC)" or similar
    if let Some((head, _)) = value.rsplit_once(" (") {
        if let Ok(date) = DateTime::parse_from_rfc2822(head) {
            return Some(date.with_timezone(&Utc));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    }

    log::debug!("unparseable date {value:?}");
    None
}

/// Point arXiv pdf links at the abstract page and drop the version suffix.
///
/// Returns the original string for anything else, including malformed urls.
pub fn display_url(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return url.to_string(),
    };

    let is_arxiv = parsed
        .host_str()
        .map(|host| {
            let host = host.to_lowercase();
            host == "arxiv.org" || host.ends_with(".arxiv.org")
        })
        .unwrap_or(false);

    if !is_arxiv {
        return url.to_string();
    }

    let path = parsed.path().to_string();
    let Some(rest) = path.strip_prefix("/pdf/") else {
        return url.to_string();
    };

    let id = rest.strip_suffix(".pdf").unwrap_or(rest);
    let id = VERSION_SUFFIX.replace(id, "");
    parsed.set_path(&format!("/abs/{id}"));

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(link: &str, title: Option<&str>, ogdate: Option<&str>) -> RemoteRecord {
        RemoteRecord {
            link: link.to_string(),
            title: title.map(String::from),
            ogdate: ogdate.map(String::from),
            created: None,
        }
    }

    #[test]
    fn test_title_falls_back_to_url() {
        let entry = normalize(record("https://example.com/a", None, None));
        assert_eq!(entry.title, "https://example.com/a");

        let entry = normalize(record("https://example.com/a", Some("   "), None));
        assert_eq!(entry.title, "https://example.com/a");
    }

    #[test]
    fn test_trims_fields() {
        let entry = normalize(record("  https://example.com  ", Some(" Title "), None));
        assert_eq!(entry.url, "https://example.com");
        assert_eq!(entry.title, "Title");
    }

    #[test]
    fn test_invalid_date_is_none() {
        let entry = normalize(record("https://example.com", Some("x"), Some("yesterday-ish")));
        assert!(entry.date.is_none());
    }

    #[test]
    fn test_created_is_fallback() {
        let mut rec = record("https://example.com", None, Some(""));
        rec.created = Some("2024-03-01 10:00:00.000Z".to_string());
        let entry = normalize(rec);
        assert_eq!(entry.display_date(), "2024-03-01");
    }

    #[test]
    fn test_unparseable_ogdate_falls_back_to_created() {
        let mut rec = record("https://example.com", None, Some("sometime in june"));
        rec.created = Some("2024-03-01 10:00:00.000Z".to_string());
        assert_eq!(normalize(rec).display_date(), "2024-03-01");

        let mut rec = record("https://example.com", None, Some("2023-06-12"));
        rec.created = Some("2024-03-01 10:00:00.000Z".to_string());
        assert_eq!(normalize(rec).display_date(), "2023-06-12");
    }

    #[test]
    fn test_date_formats() {
        assert!(parse_date("2023-06-12T08:30:00Z").is_some());
        assert!(parse_date("2023-06-12 08:30:00.123Z").is_some());
        assert!(parse_date("2023-06-12 08:30:00").is_some());
        assert!(parse_date("Mon, 12 Jun 2023 08:30:00 -0400").is_some());
        assert!(parse_date("Mon, 12 Jun 2023 08:30:00 +0000 (UTC)").is_some());
        assert!(parse_date("2023-06-12").is_some());
        assert!(parse_date("12/06/2023").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_rfc2822_keeps_instant() {
        let date = parse_date("Mon, 12 Jun 2023 23:30:00 -0400").unwrap();
        assert_eq!(date.format("%Y-%m-%d %H:%M").to_string(), "2023-06-13 03:30");
    }

    #[test]
    fn test_display_url_arxiv_pdf() {
        assert_eq!(
            display_url("https://arxiv.org/pdf/1706.03762v7"),
            "https://arxiv.org/abs/1706.03762"
        );
        assert_eq!(
            display_url("https://arxiv.org/pdf/2401.00001.pdf"),
            "https://arxiv.org/abs/2401.00001"
        );
    }

    #[test]
    fn test_display_url_untouched() {
        assert_eq!(
            display_url("https://arxiv.org/abs/1706.03762"),
            "https://arxiv.org/abs/1706.03762"
        );
        assert_eq!(
            display_url("https://example.com/pdf/file"),
            "https://example.com/pdf/file"
        );
        assert_eq!(display_url("not a url"), "not a url");
        assert_eq!(
            display_url("https://notarxiv.org/pdf/1706.03762v7"),
            "https://notarxiv.org/pdf/1706.03762v7"
        );
    }

    #[test]
    fn test_display_url_arxiv_subdomain() {
        assert_eq!(
            display_url("https://export.arxiv.org/pdf/1706.03762v2"),
            "https://export.arxiv.org/abs/1706.03762"
        );
    }
}
