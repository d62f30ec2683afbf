use async_trait::async_trait;

use super::HighFiveDigest;

/// Where notifications about matching high fives go.
#[async_trait]
pub trait NotifyBackend: Send + Sync {
    async fn send(&self, digest: &HighFiveDigest) -> anyhow::Result<()>;
}
