//! Wayback Machine provider.
//!
//! Queries the machine-readable CDX index rather than scraping.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://web.archive.org/cdx/search/cdx`
//! - **Query**: original URL, `output=json`, a result limit, and
//!   `filter=statuscode:200` so only successfully captured pages come back.
//! - **Response**: a JSON table; the first row is the column header, each
//!   following row carries a 14-digit capture timestamp.
//! - **Snapshot URL**: spliced deterministically from the timestamp and the
//!   original URL; the index is never asked for it.

use std::sync::Arc;

use async_trait::async_trait;
use snapseek_core::{ArchiveService, Snapshot};
use url::Url;

use crate::fetch::{FetchClient, FetchError, normalized_str};

use super::SnapshotProvider;

const CDX_ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";
const SNAPSHOT_BASE: &str = "https://web.archive.org/web";

/// Column to read capture timestamps from when the header is missing it.
const DEFAULT_TIMESTAMP_COLUMN: usize = 1;

/// Wayback Machine CDX index client.
pub struct WaybackProvider {
    fetch: Arc<FetchClient>,
    result_limit: usize,
}

impl WaybackProvider {
    pub fn new(fetch: Arc<FetchClient>, result_limit: usize) -> Self {
        Self { fetch, result_limit }
    }

    fn query_url(&self, original: &Url) -> Url {
        Url::parse_with_params(
            CDX_ENDPOINT,
            &[
                ("url", normalized_str(original).as_str()),
                ("output", "json"),
                ("limit", self.result_limit.to_string().as_str()),
                ("filter", "statuscode:200"),
            ],
        )
        .expect("CDX endpoint is a valid URL")
    }
}

#[async_trait]
impl SnapshotProvider for WaybackProvider {
    fn service(&self) -> ArchiveService {
        ArchiveService::Wayback
    }

    async fn fetch_candidates(&self, url: &Url) -> Result<Vec<Snapshot>, FetchError> {
        let query = self.query_url(url);
        let response = self.fetch.get(&query).await?;

        if !response.status.is_success() {
            return Err(FetchError::http(response.status, response.text()));
        }

        Ok(parse_cdx(&response.text(), url))
    }
}

/// Parse a CDX JSON table into snapshot candidates.
///
/// Rows are independent; a row that doesn't carry a usable timestamp is
/// skipped. A body that isn't a CDX table at all yields an empty list.
pub(crate) fn parse_cdx(body: &str, original: &Url) -> Vec<Snapshot> {
    let rows: Vec<Vec<String>> = match serde_json::from_str(body) {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!("unparseable CDX response: {err}");
            return Vec::new();
        }
    };

    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let ts_column = header
        .iter()
        .position(|col| col == "timestamp")
        .unwrap_or(DEFAULT_TIMESTAMP_COLUMN);

    let original = normalized_str(original);

    rows.filter_map(|row| {
        let ts = row.get(ts_column)?;
        if ts.len() != 14 || !ts.bytes().all(|b| b.is_ascii_digit()) {
            tracing::debug!("skipping CDX row with timestamp {ts:?}");
            return None;
        }
        Some(Snapshot::new(format!("{SNAPSHOT_BASE}/{ts}/{original}"), ts.clone()))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchConfig, canonicalize};

    const FIXTURE_CDX: &str = r#"[
        ["urlkey", "timestamp", "original", "mimetype", "statuscode", "digest", "length"],
        ["com,example)/", "20230101000000", "https://example.com/", "text/html", "200", "AAAA", "1234"],
        ["com,example)/", "20200615120000", "https://example.com/", "text/html", "200", "BBBB", "1301"]
    ]"#;

    fn original() -> Url {
        canonicalize("https://example.com").unwrap()
    }

    #[test]
    fn test_parse_cdx_splices_snapshot_urls() {
        let snapshots = parse_cdx(FIXTURE_CDX, &original());
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].url, "https://web.archive.org/web/20230101000000/https://example.com");
        assert_eq!(snapshots[0].timestamp, "20230101000000");
        assert_eq!(snapshots[1].url, "https://web.archive.org/web/20200615120000/https://example.com");
    }

    #[test]
    fn test_parse_cdx_header_only() {
        let body = r#"[["urlkey", "timestamp", "original"]]"#;
        assert!(parse_cdx(body, &original()).is_empty());
    }

    #[test]
    fn test_parse_cdx_empty_body() {
        assert!(parse_cdx("[]", &original()).is_empty());
    }

    #[test]
    fn test_parse_cdx_malformed_is_empty_not_error() {
        assert!(parse_cdx("<html>not json</html>", &original()).is_empty());
        assert!(parse_cdx(r#"{"unexpected": "shape"}"#, &original()).is_empty());
    }

    #[test]
    fn test_parse_cdx_skips_bad_timestamps() {
        let body = r#"[
            ["urlkey", "timestamp", "original"],
            ["com,example)/", "not-a-ts", "https://example.com/"],
            ["com,example)/", "20230101000000", "https://example.com/"]
        ]"#;
        let snapshots = parse_cdx(body, &original());
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].timestamp, "20230101000000");
    }

    #[test]
    fn test_parse_cdx_header_column_order_respected() {
        // Timestamp deliberately not in its usual column.
        let body = r#"[
            ["original", "urlkey", "timestamp"],
            ["https://example.com/", "com,example)/", "20230101000000"]
        ]"#;
        let snapshots = parse_cdx(body, &original());
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].timestamp, "20230101000000");
    }

    #[test]
    fn test_query_url_parameters() {
        let fetch = Arc::new(FetchClient::new(FetchConfig::default()).unwrap());
        let provider = WaybackProvider::new(fetch, 50);
        let query = provider.query_url(&original());

        assert_eq!(query.host_str(), Some("web.archive.org"));
        let pairs: Vec<(String, String)> = query
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("url".into(), "https://example.com".into())));
        assert!(pairs.contains(&("output".into(), "json".into())));
        assert!(pairs.contains(&("limit".into(), "50".into())));
        assert!(pairs.contains(&("filter".into(), "statuscode:200".into())));
    }
}
