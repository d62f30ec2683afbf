use serde::Deserialize;

/// One page of the listing endpoint.
///
/// `count` is not stable between pages: the upstream alternates between the
/// number of live records and (apparently) the highest record id, so callers
/// must not treat a single page's value as the total.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPage {
    #[serde(rename = "Count")]
    pub count: u64,
    #[serde(rename = "Results")]
    pub results: Vec<RawRecord>,
}

/// A single listing result. Only the id and markup fragment are kept; the
/// endpoint returns more fields (`Language`, `Path`, `Url`, ...) which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Html")]
    pub html: String,
}

/// Query parameter names carrying the page size and the zero-based offset.
/// The listing endpoint calls them `p` and `e`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingParams {
    pub count: String,
    pub offset: String,
}

impl PagingParams {
    pub fn new(count: impl Into<String>, offset: impl Into<String>) -> Self {
        Self {
            count: count.into(),
            offset: offset.into(),
        }
    }
}

impl Default for PagingParams {
    fn default() -> Self {
        Self::new("p", "e")
    }
}

/// Retry settings for transient transport failures.
///
/// The delay before retry `n` (1-based) is `backoff_factor * 2^(n-1)` seconds,
/// capped at [`RetryPolicy::MAX_BACKOFF_SECS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub const MAX_BACKOFF_SECS: f64 = 120.0;

    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    pub fn delay_for(&self, retry: u32) -> std::time::Duration {
        if retry == 0 || self.backoff_factor <= 0.0 {
            return std::time::Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(retry as i32 - 1);
        std::time::Duration::from_secs_f64(secs.min(Self::MAX_BACKOFF_SECS))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn backoff_doubles_per_retry() {
        let policy = RetryPolicy::new(5, 0.5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3), Duration::from_secs(2));
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::new(20, 10.0);
        assert_eq!(policy.delay_for(15), Duration::from_secs(120));
    }

    #[test]
    fn zero_factor_never_sleeps() {
        let policy = RetryPolicy::new(3, 0.0);
        assert_eq!(policy.delay_for(3), Duration::ZERO);
    }

    #[test]
    fn page_ignores_extra_fields() {
        let json = r#"{
            "Count": 2,
            "Results": [
                {"Id": "a", "Language": "en", "Url": "https://x", "Name": null, "Html": "<div></div>"}
            ]
        }"#;
        let page: ListingPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.results[0].id, "a");
    }

    #[test]
    fn page_without_count_is_rejected() {
        let json = r#"{"Results": []}"#;
        assert!(serde_json::from_str::<ListingPage>(json).is_err());
    }
}
