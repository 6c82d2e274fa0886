//! GhostArchive provider.
//!
//! GhostArchive has no index API, so this provider works the way a person
//! would: for recognized video links it probes the deterministic archive URL
//! built from the video ID, and otherwise (or when the probe misses) it runs
//! the site's full-text search and scrapes the result listing.
//!
//! Scraping is inherently fragile; everything HTML-shaped is parsed by
//! fixture-tested helpers, and markup surprises degrade to "no candidates"
//! rather than errors.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use snapseek_core::{ArchiveService, Snapshot, model::is_archive_url};
use url::Url;

use crate::fetch::{FetchClient, FetchError, normalized_str};
use crate::title::scrape_title;

use super::SnapshotProvider;

const BASE_URL: &str = "https://ghostarchive.org";

/// YouTube video IDs: the only video platform GhostArchive archives by ID.
const VIDEO_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{6,12}$";

/// Timestamp placeholder when the probe page doesn't reveal a capture date.
const UNKNOWN_TIMESTAMP: &str = "unknown";

/// Extract a video ID from a YouTube-shaped URL.
///
/// Recognizes `youtu.be/<id>`, `youtube.com/watch?v=<id>`, and the
/// `shorts`/`embed`/`live` path forms.
pub(crate) fn extract_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_start_matches("www.");

    let candidate = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        let mut segments = url.path_segments()?;
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("shorts") | Some("embed") | Some("live") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    }?;

    let id_re = Regex::new(VIDEO_ID_PATTERN).expect("invalid regex");
    if id_re.is_match(&candidate) { Some(candidate) } else { None }
}

/// GhostArchive client: direct probe plus search-page scrape.
pub struct GhostArchiveProvider {
    fetch: Arc<FetchClient>,
}

impl GhostArchiveProvider {
    pub fn new(fetch: Arc<FetchClient>) -> Self {
        Self { fetch }
    }

    /// Probe the deterministic video-archive URL for an ID.
    ///
    /// 200 means the archive exists; 404 means it doesn't. Any other status
    /// is ambiguous and treated as "no candidate": the search fallback still
    /// runs, and the retry loop is reserved for transport failures.
    async fn probe_video(&self, id: &str) -> Result<Option<Snapshot>, FetchError> {
        let probe_url = Url::parse(&format!("{BASE_URL}/varchive/{id}")).expect("probe URL is valid");
        let response = self.fetch.get(&probe_url).await?;

        match response.status.as_u16() {
            200 => {
                let html = response.text();
                let mut snapshot = Snapshot::new(probe_url, scrape_probe_timestamp(&html));
                if let Some(title) = scrape_title(&html) {
                    snapshot = snapshot.with_title(title);
                }
                Ok(Some(snapshot))
            }
            404 => Ok(None),
            status => {
                tracing::debug!(status, id, "ambiguous probe status, falling back to search");
                Ok(None)
            }
        }
    }

    /// Full-text search over the archive, scraping the result listing.
    async fn search(&self, original: &Url, video_id: Option<&str>) -> Result<Vec<Snapshot>, FetchError> {
        let search_url = Url::parse_with_params(
            &format!("{BASE_URL}/search"),
            &[("term", normalized_str(original))],
        )
        .expect("search URL is valid");

        let response = self.fetch.get(&search_url).await?;
        if !response.status.is_success() {
            return Err(FetchError::http(response.status, response.text()));
        }

        Ok(parse_search_results(&response.text(), video_id))
    }
}

#[async_trait]
impl SnapshotProvider for GhostArchiveProvider {
    fn service(&self) -> ArchiveService {
        ArchiveService::GhostArchive
    }

    async fn fetch_candidates(&self, url: &Url) -> Result<Vec<Snapshot>, FetchError> {
        let video_id = extract_video_id(url);

        if let Some(id) = &video_id
            && let Some(snapshot) = self.probe_video(id).await?
        {
            return Ok(vec![snapshot]);
        }

        self.search(url, video_id.as_deref()).await
    }
}

/// Pull a capture timestamp out of a probe page.
///
/// Prefers an explicit `<time>` element (datetime attribute, then text),
/// falling back to the first ISO-date-shaped string anywhere in the page.
fn scrape_probe_timestamp(html: &str) -> String {
    let document = Html::parse_document(html);
    let time_selector = Selector::parse("time").expect("invalid selector");

    if let Some(element) = document.select(&time_selector).next() {
        if let Some(datetime) = element.value().attr("datetime") {
            let datetime = datetime.trim();
            if !datetime.is_empty() {
                return datetime.to_string();
            }
        }
        let text = element.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return text;
        }
    }

    let date_re = Regex::new(r"\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}(?::\d{2})?)?").expect("invalid regex");
    let body_text = document.root_element().text().collect::<String>();
    date_re
        .find(&body_text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_string())
}

/// Parse a search-result listing into snapshot candidates.
///
/// Each result row carries a link to the archived copy plus an adjacent
/// timestamp cell. Rows that don't link into the archive are skipped, as are
/// rows that don't mention the video ID when one is known. Markup this
/// function doesn't recognize yields an empty list.
pub(crate) fn parse_search_results(html: &str, video_id: Option<&str>) -> Vec<Snapshot> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").expect("invalid selector");
    let link_selector = Selector::parse("a[href]").expect("invalid selector");
    let cell_selector = Selector::parse("td").expect("invalid selector");
    let base = Url::parse(BASE_URL).expect("base URL is valid");

    let mut seen = HashSet::new();
    let mut snapshots = Vec::new();

    for row in document.select(&row_selector) {
        let Some(link) = row.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };

        if !is_archive_url(resolved.as_str()) {
            continue;
        }
        if let Some(id) = video_id
            && !resolved.as_str().contains(id)
        {
            continue;
        }
        if !seen.insert(resolved.to_string()) {
            continue;
        }

        // The timestamp lives in a sibling cell: the first one with a
        // date-like text that isn't itself a URL.
        let timestamp = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .find(|text| !text.is_empty() && !text.contains("://") && text.chars().any(|c| c.is_ascii_digit()))
            .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_string());

        snapshots.push(Snapshot::new(resolved, timestamp));
    }

    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_SEARCH: &str = r#"
        <html><body>
        <table>
            <tr><th>Archived page</th><th>Capture date</th></tr>
            <tr>
                <td><a href="/varchive/dQw4w9WgXcQ">https://www.youtube.com/watch?v=dQw4w9WgXcQ</a></td>
                <td>2023-05-14</td>
            </tr>
            <tr>
                <td><a href="/archive/aB3dE">https://example.com/page</a></td>
                <td>2022-11-02</td>
            </tr>
            <tr>
                <td><a href="https://example.com/offsite">offsite link, not an archive</a></td>
                <td>2022-01-01</td>
            </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_extract_video_id_watch() {
        let url = Url::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(extract_video_id(&url).as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_extract_video_id_short_link() {
        let url = Url::parse("https://youtu.be/dQw4w9WgXcQ?t=42").unwrap();
        assert_eq!(extract_video_id(&url).as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_extract_video_id_shorts_and_embed() {
        let url = Url::parse("https://youtube.com/shorts/abc123XYZ_-").unwrap();
        assert_eq!(extract_video_id(&url).as_deref(), Some("abc123XYZ_-"));

        let url = Url::parse("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap();
        assert_eq!(extract_video_id(&url).as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_extract_video_id_rejects_non_video() {
        assert_eq!(extract_video_id(&Url::parse("https://example.com/watch?v=abc123def45").unwrap()), None);
        assert_eq!(extract_video_id(&Url::parse("https://www.youtube.com/feed/history").unwrap()), None);
        // Malformed ID: too short.
        assert_eq!(extract_video_id(&Url::parse("https://youtu.be/ab").unwrap()), None);
    }

    #[test]
    fn test_parse_search_results_basic() {
        let snapshots = parse_search_results(FIXTURE_SEARCH, None);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].url, "https://ghostarchive.org/varchive/dQw4w9WgXcQ");
        assert_eq!(snapshots[0].timestamp, "2023-05-14");
        assert_eq!(snapshots[1].url, "https://ghostarchive.org/archive/aB3dE");
        assert_eq!(snapshots[1].timestamp, "2022-11-02");
    }

    #[test]
    fn test_parse_search_results_filters_by_video_id() {
        let snapshots = parse_search_results(FIXTURE_SEARCH, Some("dQw4w9WgXcQ"));
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].url, "https://ghostarchive.org/varchive/dQw4w9WgXcQ");
    }

    #[test]
    fn test_parse_search_results_malformed_is_empty() {
        assert!(parse_search_results("", None).is_empty());
        assert!(parse_search_results("<div>no table here</div>", None).is_empty());
        assert!(parse_search_results("<<<%%% not html", None).is_empty());
    }

    #[test]
    fn test_parse_search_results_dedups_rows() {
        let html = r#"
            <table>
                <tr><td><a href="/archive/aB3dE">first</a></td><td>2022-11-02</td></tr>
                <tr><td><a href="/archive/aB3dE">again</a></td><td>2022-11-02</td></tr>
            </table>
        "#;
        assert_eq!(parse_search_results(html, None).len(), 1);
    }

    #[test]
    fn test_scrape_probe_timestamp_time_element() {
        let html = r#"<html><body>Archived <time datetime="2023-05-14T10:00:00">May 14, 2023</time></body></html>"#;
        assert_eq!(scrape_probe_timestamp(html), "2023-05-14T10:00:00");

        let html = r#"<html><body><time>2023-05-14</time></body></html>"#;
        assert_eq!(scrape_probe_timestamp(html), "2023-05-14");
    }

    #[test]
    fn test_scrape_probe_timestamp_body_fallback() {
        let html = "<html><body><p>This page was captured on 2023-05-14 10:00:12.</p></body></html>";
        assert_eq!(scrape_probe_timestamp(html), "2023-05-14 10:00:12");
    }

    #[test]
    fn test_scrape_probe_timestamp_unknown() {
        let html = "<html><body><p>No date to be found.</p></body></html>";
        assert_eq!(scrape_probe_timestamp(html), UNKNOWN_TIMESTAMP);
    }
}
