//! Relevance scoring for candidate snapshots.
//!
//! Scoring is additive over independent signals: timestamp plausibility and
//! recency, plus the shape of the archive URL's path. The weights were tuned
//! empirically against real archive listings; they are kept as named
//! constants and should be recalibrated with data, not nudged ad hoc.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use snapseek_core::Snapshot;
use url::Url;

/// Snapshot carries a syntactically valid, in-range timestamp.
pub const VALID_TIMESTAMP_POINTS: u32 = 30;
/// That timestamp falls within the last two years.
pub const RECENT_TIMESTAMP_POINTS: u32 = 20;
/// Path is a single short alphanumeric segment (canonical short-code form).
pub const SHORT_CODE_POINTS: u32 = 25;
/// Path has a numeric date segment followed by another segment.
pub const DATED_PATH_POINTS: u32 = 20;
/// The segment after the date contains the original hostname.
pub const HOST_IN_PATH_POINTS: u32 = 15;

/// Timestamps before this year are garbage, not history.
const MIN_PLAUSIBLE_YEAR: i32 = 1990;
const RECENT_WINDOW_DAYS: i64 = 730;

/// Parse a service-reported timestamp into a comparable datetime.
///
/// Accepts the formats the providers actually emit: 14-digit Wayback
/// (`YYYYMMDDhhmmss`), bare 8-digit dates, RFC 3339, and `YYYY-MM-DD`.
/// Anything else (including the "unknown" placeholder) is unparseable.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.len() == 14 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDateTime::parse_from_str(raw, "%Y%m%d%H%M%S").ok();
    }

    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Score one snapshot against the original URL. Higher is better.
///
/// Pure and deterministic for a fixed clock; adding a valid timestamp to an
/// otherwise-identical snapshot never lowers the score.
pub fn score(snapshot: &Snapshot, original: &Url) -> u32 {
    let mut points = 0;

    let now = Utc::now().naive_utc();
    if let Some(ts) = parse_timestamp(&snapshot.timestamp) {
        let year = ts.year();
        if year >= MIN_PLAUSIBLE_YEAR && year <= now.year() + 1 {
            points += VALID_TIMESTAMP_POINTS;
            if now.signed_duration_since(ts).num_days() <= RECENT_WINDOW_DAYS {
                points += RECENT_TIMESTAMP_POINTS;
            }
        }
    }

    points + path_shape_points(&snapshot.url, original)
}

/// Points for the shape of the archive URL's path.
///
/// Exactly one of the two shapes can apply; no other shape scores.
fn path_shape_points(snapshot_url: &str, original: &Url) -> u32 {
    let Ok(url) = Url::parse(snapshot_url) else {
        return 0;
    };
    let Some(segments) = url.path_segments() else {
        return 0;
    };
    let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();

    if segments.len() == 1 {
        let seg = segments[0];
        if (3..=10).contains(&seg.len()) && seg.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return SHORT_CODE_POINTS;
        }
        return 0;
    }

    for (i, seg) in segments.iter().enumerate() {
        if (8..=14).contains(&seg.len()) && seg.bytes().all(|b| b.is_ascii_digit()) {
            if i + 1 >= segments.len() {
                return 0;
            }
            let mut points = DATED_PATH_POINTS;
            let host = original
                .host_str()
                .unwrap_or_default()
                .trim_start_matches("www.");
            if !host.is_empty() && segments[i + 1..].join("/").contains(host) {
                points += HOST_IN_PATH_POINTS;
            }
            return points;
        }
    }

    0
}

/// Order snapshots by descending score, ties broken by descending parsed
/// timestamp. Unparseable timestamps sort strictly after parseable ones.
pub fn rank(snapshots: Vec<Snapshot>, original: &Url) -> Vec<Snapshot> {
    let mut keyed: Vec<(u32, Option<NaiveDateTime>, Snapshot)> = snapshots
        .into_iter()
        .map(|s| (score(&s, original), parse_timestamp(&s.timestamp), s))
        .collect();

    // Option<NaiveDateTime> orders None first, so the reversed comparison
    // lands unparseable timestamps at the tail.
    keyed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    keyed.into_iter().map(|(_, _, s)| s).collect()
}
