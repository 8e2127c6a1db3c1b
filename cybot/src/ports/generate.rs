use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Failures surface as `CyBotError::Generation`.
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn model_name(&self) -> &str;
}
