//! Best-effort page-title extraction.
//!
//! Titles are cosmetic, so nothing here can fail: any trouble falls back to
//! the URL's hostname, and failing that to the literal `"Link"`. Only titles
//! actually scraped from a page enter the cache; fallbacks are recomputed so
//! a transient fetch failure doesn't pin a bad title for a day.

use std::time::Duration;

use scraper::{Html, Selector};
use snapseek_core::LruCache;
use url::Url;

use crate::fetch::{FetchClient, cache_key, canonicalize};

/// Last-resort title when even the hostname is unavailable.
const FALLBACK_TITLE: &str = "Link";

/// Pull the `<title>` text out of an HTML document, whitespace-collapsed.
pub(crate) fn scrape_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").expect("invalid selector");

    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() { None } else { Some(collapsed) }
}

/// Fetch a page and extract its title, memoized through `titles`.
///
/// `timeout` bounds the fetch independently of the provider timeout; a slow
/// page costs at most that long before the hostname fallback kicks in.
pub(crate) async fn extract_title(
    fetch: &FetchClient, titles: &LruCache<String>, timeout: Duration, url: &str,
) -> String {
    let Ok(url) = canonicalize(url) else {
        return FALLBACK_TITLE.to_string();
    };
    let key = cache_key(&url);

    if let Some(title) = titles.get(&key).await {
        tracing::debug!(url = %url, "title cache hit");
        return title;
    }

    match fetch.get_with_timeout(&url, timeout).await {
        Ok(response) if response.status.is_success() => {
            if let Some(title) = scrape_title(&response.text()) {
                titles.insert(key, title.clone()).await;
                return title;
            }
        }
        Ok(response) => {
            tracing::debug!(url = %url, status = %response.status, "title fetch unsuccessful");
        }
        Err(err) => {
            tracing::debug!(url = %url, error = %err, "title fetch failed");
        }
    }

    hostname_fallback(&url)
}

fn hostname_fallback(url: &Url) -> String {
    match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => FALLBACK_TITLE.to_string(),
    }
}
