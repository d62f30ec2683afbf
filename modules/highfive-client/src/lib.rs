pub mod error;
pub mod types;

pub use error::{HighFiveError, Result};
pub use types::{ListingPage, PagingParams, RawRecord, RetryPolicy};

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HighFiveClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    paging: PagingParams,
}

impl HighFiveClient {
    /// `base_url` is the full search URL without the paging parameters.
    pub fn new(base_url: &str, retry: RetryPolicy) -> Result<Self> {
        // Fail early on a bad URL rather than on the first page.
        Url::parse(base_url).map_err(|e| HighFiveError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            retry,
            paging: PagingParams::default(),
        })
    }

    /// Use different query parameter names for the page size and offset.
    pub fn with_paging_params(mut self, paging: PagingParams) -> Self {
        self.paging = paging;
        self
    }

    /// Build the URL for one page.
    pub fn page_url(&self, count: u32, offset: u64) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| HighFiveError::InvalidUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair(&self.paging.count, &count.to_string())
            .append_pair(&self.paging.offset, &offset.to_string());
        Ok(url)
    }

    /// Fetch and decode one listing page.
    pub async fn fetch_page(&self, count: u32, offset: u64) -> Result<ListingPage> {
        let url = self.page_url(count, offset)?;
        let body = self.get_text(url.as_str()).await?;
        let page: ListingPage = serde_json::from_str(&body)?;
        debug!(offset, count = page.count, results = page.results.len(), "Fetched listing page");
        Ok(page)
    }

    /// GET a URL, retrying connection failures, timeouts, 429 and 5xx
    /// responses according to the retry policy. Any other non-success status
    /// fails immediately.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let mut retry = 0u32;
        loop {
            let err = match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.text().await?);
                    }
                    let message = resp.text().await.unwrap_or_default();
                    let err = HighFiveError::Api {
                        status: status.as_u16(),
                        message,
                    };
                    if !is_transient(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => e.into(),
                Err(e) => return Err(e.into()),
            };

            if retry >= self.retry.max_retries {
                warn!(
                    url,
                    attempts = retry + 1,
                    error = %err,
                    "Giving up on request after exhausting retries"
                );
                return Err(err);
            }

            retry += 1;
            let delay = self.retry.delay_for(retry);
            warn!(
                url,
                retry,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient request failure, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_appends_to_existing_query() {
        let client = HighFiveClient::new(
            "https://example.org/search?q=&s={ABC}&itemid={DEF}",
            RetryPolicy::default(),
        )
        .unwrap();
        let url = client.page_url(20, 40).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("s".to_string(), "{ABC}".to_string())));
        assert!(pairs.contains(&("p".to_string(), "20".to_string())));
        assert!(pairs.contains(&("e".to_string(), "40".to_string())));
    }

    #[test]
    fn page_url_without_existing_query() {
        let client =
            HighFiveClient::new("https://example.org/search", RetryPolicy::default()).unwrap();
        let url = client.page_url(5, 0).unwrap();
        assert_eq!(url.as_str(), "https://example.org/search?p=5&e=0");
    }

    #[test]
    fn paging_param_names_can_be_overridden() {
        let client = HighFiveClient::new("https://example.org/search", RetryPolicy::default())
            .unwrap()
            .with_paging_params(PagingParams::new("count", "offset"));
        let url = client.page_url(5, 10).unwrap();
        assert_eq!(url.as_str(), "https://example.org/search?count=5&offset=10");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HighFiveClient::new("not a url", RetryPolicy::default())
            .err()
            .unwrap();
        assert!(matches!(err, HighFiveError::InvalidUrl { .. }));
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::NOT_FOUND));
        assert!(!is_transient(StatusCode::FORBIDDEN));
    }
}
