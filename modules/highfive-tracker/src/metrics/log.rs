use async_trait::async_trait;
use tracing::info;

use super::backend::MetricsBackend;
use super::MetricDatum;

/// Writes each datum as a structured log line. Used when no metrics endpoint
/// is configured.
pub struct LogMetrics;

#[async_trait]
impl MetricsBackend for LogMetrics {
    async fn put(&self, data: &[MetricDatum]) -> anyhow::Result<()> {
        for datum in data {
            info!(
                namespace = %datum.namespace,
                environment = %datum.environment,
                metric = %datum.name,
                value = datum.value,
                unit = ?datum.unit,
                "metric"
            );
        }
        Ok(())
    }
}
