use std::sync::Arc;

use crate::domain::{DocumentId, Passage, RetrievalQuery, ScoredPassage};
use crate::error::{CyBotError, Result};
use crate::index::{DocumentIndexRegistry, VectorIndex};
use crate::ports::{EmbeddingGenerator, Reranker};

/// Dual-source retrieval: the knowledge base plus, optionally, one uploaded
/// document, merged and reranked against the query.
pub struct RetrievalService {
    knowledge_base: Arc<VectorIndex>,
    registry: Arc<DocumentIndexRegistry>,
    embedder: Arc<dyn EmbeddingGenerator>,
    reranker: Arc<dyn Reranker>,
}

impl RetrievalService {
    pub fn new(
        knowledge_base: Arc<VectorIndex>,
        registry: Arc<DocumentIndexRegistry>,
        embedder: Arc<dyn EmbeddingGenerator>,
        reranker: Arc<dyn Reranker>,
    ) -> Self {
        Self {
            knowledge_base,
            registry,
            embedder,
            reranker,
        }
    }

    pub fn knowledge_base(&self) -> &Arc<VectorIndex> {
        &self.knowledge_base
    }

    pub async fn retrieve_and_rerank(
        &self,
        query: &RetrievalQuery,
        active_document: Option<&DocumentId>,
    ) -> Result<Vec<Passage>> {
        let candidates = self.candidates(query, active_document).await?;
        self.rerank(query, candidates).await
    }

    /// Vector-search candidates from both sources, knowledge base first.
    pub async fn candidates(
        &self,
        query: &RetrievalQuery,
        active_document: Option<&DocumentId>,
    ) -> Result<Vec<ScoredPassage>> {
        let vector = self
            .embedder
            .embed(&query.query)
            .await
            .map_err(|e| CyBotError::Retrieval(format!("could not embed query: {e}")))?;

        let mut candidates = self
            .knowledge_base
            .search(&vector, query.top_k_retrieve)
            .map_err(|e| CyBotError::Retrieval(format!("knowledge base: {e}")))?;

        // The Arc keeps the index alive even if it is evicted mid-search.
        if let Some(id) = active_document
            && let Some(document) = self.registry.lookup(id)
        {
            let hits = document
                .search(&vector, query.top_k_retrieve)
                .map_err(|e| CyBotError::Retrieval(format!("document {id}: {e}")))?;
            candidates.extend(hits);
        } else if let Some(id) = active_document {
            tracing::debug!(document = %id, "active document not registered, using knowledge base only");
        }

        tracing::debug!(candidates = candidates.len(), "retrieved candidates");
        Ok(candidates)
    }

    /// Scores every candidate against the query, sorts descending (stable on
    /// ties) and keeps `top_k_final`. Failures are `CyBotError::Rerank`.
    pub async fn rerank(&self, query: &RetrievalQuery, candidates: Vec<ScoredPassage>) -> Result<Vec<Passage>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let name = self.reranker.name();
        let texts: Vec<&str> = candidates.iter().map(|c| c.passage.content.as_str()).collect();
        let scores = self
            .reranker
            .score(&query.query, &texts)
            .await
            .map_err(|e| match e {
                CyBotError::Rerank(_) => e,
                other => CyBotError::Rerank(format!("{name}: {other}")),
            })?;

        if scores.len() != candidates.len() {
            return Err(CyBotError::Rerank(format!(
                "{name} returned {} scores for {} passages",
                scores.len(),
                candidates.len()
            )));
        }

        let mut ranked: Vec<ScoredPassage> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, score)| ScoredPassage::new(candidate.passage, score))
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked
            .into_iter()
            .take(query.top_k_final)
            .map(|scored| scored.passage)
            .collect())
    }
}
