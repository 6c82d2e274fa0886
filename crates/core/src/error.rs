//! Unified error types and the lookup-failure classifier.
//!
//! Transport failures are caught at the provider boundary and mapped into the
//! closed [`ErrorKind`] taxonomy, which drives the retry/abort decision in the
//! resolver. The classifier is total: any (status, message) pair maps to a
//! kind, and classification itself can never fail.

use serde::{Deserialize, Serialize};

/// Caller-facing errors for the snapseek engine.
///
/// Lookup failures never surface here; they fold into a negative
/// [`Resolution`](crate::Resolution). This enum is reserved for caller
/// mistakes and construction-time problems.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied URL could not be canonicalized.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No provider is registered for the configured service.
    #[error("UNSUPPORTED_SERVICE: {0}")]
    UnsupportedService(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP_CLIENT: {0}")]
    HttpClient(String),

    /// Configuration loading or validation failed.
    #[error("CONFIG: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Closed taxonomy of lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The service refused us (HTTP 429 or an explicit rate-limit message).
    /// Surfaced as a structured flag and never retried.
    RateLimited,
    /// The service is demanding a human (CAPTCHA / bot-challenge page).
    CaptchaRequired,
    /// Plain 403 with no challenge markers; our address is blocked.
    IpBlocked,
    /// The service itself is down or its gateway timed out.
    ServiceUnavailable,
    /// Transport-level failure: timeout, connection reset, DNS, etc.
    NetworkError,
    /// Anything that matched no other rule.
    Unknown,
}

/// Markers that distinguish a bot challenge from a plain block on a 403.
const CAPTCHA_MARKERS: &[&str] = &["captcha", "cloudflare", "challenge"];

impl ErrorKind {
    /// Classify a raw failure into the taxonomy. First match wins.
    ///
    /// `status` is the HTTP status when one was received; `message` is the
    /// error display or response body, matched case-insensitively.
    pub fn classify(status: Option<u16>, message: &str) -> ErrorKind {
        let message = message.to_lowercase();

        if status == Some(429) || message.contains("rate limit") || message.contains("too many requests") {
            return ErrorKind::RateLimited;
        }

        if status == Some(403) {
            if CAPTCHA_MARKERS.iter().any(|m| message.contains(m)) {
                return ErrorKind::CaptchaRequired;
            }
            return ErrorKind::IpBlocked;
        }

        if status == Some(503)
            || status == Some(504)
            || message.contains("service unavailable")
            || message.contains("gateway timeout")
        {
            return ErrorKind::ServiceUnavailable;
        }

        if message.contains("network") || message.contains("timeout") || message.contains("connection refused") {
            return ErrorKind::NetworkError;
        }

        ErrorKind::Unknown
    }

    /// Whether the resolver should retry with backoff on this kind.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::NetworkError | ErrorKind::ServiceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limited() {
        assert_eq!(ErrorKind::classify(Some(429), ""), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::classify(None, "Rate limit exceeded"), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::classify(Some(200), "Too Many Requests"), ErrorKind::RateLimited);
    }

    #[test]
    fn test_classify_captcha_vs_blocked() {
        assert_eq!(
            ErrorKind::classify(Some(403), "please solve this CAPTCHA to continue"),
            ErrorKind::CaptchaRequired
        );
        assert_eq!(
            ErrorKind::classify(Some(403), "Checking your browser - Cloudflare"),
            ErrorKind::CaptchaRequired
        );
        assert_eq!(ErrorKind::classify(Some(403), "Forbidden"), ErrorKind::IpBlocked);
        assert_eq!(ErrorKind::classify(Some(403), ""), ErrorKind::IpBlocked);
    }

    #[test]
    fn test_classify_service_unavailable() {
        assert_eq!(ErrorKind::classify(Some(503), ""), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::classify(Some(504), ""), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::classify(None, "Service Unavailable"), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::classify(None, "502 gateway timeout"), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_classify_network() {
        assert_eq!(ErrorKind::classify(None, "network error: dns failure"), ErrorKind::NetworkError);
        assert_eq!(ErrorKind::classify(None, "request timeout"), ErrorKind::NetworkError);
        assert_eq!(ErrorKind::classify(None, "Connection refused"), ErrorKind::NetworkError);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(ErrorKind::classify(None, ""), ErrorKind::Unknown);
        assert_eq!(ErrorKind::classify(Some(418), "I'm a teapot"), ErrorKind::Unknown);
    }

    #[test]
    fn test_classify_order_rate_limit_beats_403() {
        // A 403 body that also mentions rate limiting is a rate limit.
        assert_eq!(
            ErrorKind::classify(Some(403), "rate limit exceeded, captcha required"),
            ErrorKind::RateLimited
        );
    }

    #[test]
    fn test_classify_idempotent() {
        let inputs: &[(Option<u16>, &str)] = &[
            (Some(429), ""),
            (Some(403), "captcha"),
            (Some(403), "forbidden"),
            (Some(503), ""),
            (None, "timeout"),
            (None, "???"),
        ];
        for (status, message) in inputs {
            assert_eq!(
                ErrorKind::classify(*status, message),
                ErrorKind::classify(*status, message)
            );
        }
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::NetworkError.is_retryable());
        assert!(ErrorKind::ServiceUnavailable.is_retryable());
        assert!(!ErrorKind::RateLimited.is_retryable());
        assert!(!ErrorKind::CaptchaRequired.is_retryable());
        assert!(!ErrorKind::IpBlocked.is_retryable());
        assert!(!ErrorKind::Unknown.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("INVALID_URL"));

        let err = Error::UnsupportedService("archive.today".to_string());
        assert!(err.to_string().contains("UNSUPPORTED_SERVICE"));
    }
}
