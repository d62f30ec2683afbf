use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::backend::MetricsBackend;
use super::MetricDatum;

/// POSTs metric data as JSON to a collector endpoint.
pub struct HttpMetrics {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpMetrics {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MetricsBackend for HttpMetrics {
    async fn put(&self, data: &[MetricDatum]) -> anyhow::Result<()> {
        let payload = json!({ "metrics": data });

        let resp = self.http.post(&self.endpoint).json(&payload).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Metrics endpoint returned non-success");
            anyhow::bail!("Metrics endpoint returned {status}");
        }

        info!(count = data.len(), "Metrics sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricUnit;
    use mockito::Matcher;

    fn datum() -> MetricDatum {
        MetricDatum {
            namespace: "HighFiveTracker".into(),
            environment: "prod".into(),
            name: "TotalHighFives".into(),
            value: 42.0,
            unit: MetricUnit::Count,
        }
    }

    #[tokio::test]
    async fn posts_metrics_as_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/metrics")
            .match_body(Matcher::PartialJson(json!({
                "metrics": [{
                    "namespace": "HighFiveTracker",
                    "environment": "prod",
                    "name": "TotalHighFives",
                    "value": 42.0,
                    "unit": "Count"
                }]
            })))
            .with_status(200)
            .create_async()
            .await;

        let backend = HttpMetrics::new(format!("{}/metrics", server.url()));
        backend.put(&[datum()]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/metrics")
            .with_status(500)
            .create_async()
            .await;

        let backend = HttpMetrics::new(format!("{}/metrics", server.url()));
        let err = backend.put(&[datum()]).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
