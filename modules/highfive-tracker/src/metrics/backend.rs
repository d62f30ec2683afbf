use async_trait::async_trait;

use super::MetricDatum;

#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn put(&self, data: &[MetricDatum]) -> anyhow::Result<()>;
}

/// Used when metrics are disabled.
pub struct NoopMetrics;

#[async_trait]
impl MetricsBackend for NoopMetrics {
    async fn put(&self, _data: &[MetricDatum]) -> anyhow::Result<()> {
        Ok(())
    }
}
