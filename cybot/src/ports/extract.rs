use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Failures surface as `CyBotError::Ingestion`.
    async fn extract_text(&self, raw: &[u8]) -> Result<String>;
}
