use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Returns one score per passage, in input order. Scores are unbounded;
    /// only their relative order within one call is meaningful.
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>>;
    fn name(&self) -> &str;
}
