use async_trait::async_trait;
use tracing::info;

use super::backend::NotifyBackend;
use super::HighFiveDigest;

/// Used when notifications are disabled.
pub struct NoopBackend;

#[async_trait]
impl NotifyBackend for NoopBackend {
    async fn send(&self, digest: &HighFiveDigest) -> anyhow::Result<()> {
        info!(count = digest.count, subject = %digest.subject, "Notifications disabled, not sending");
        Ok(())
    }
}
