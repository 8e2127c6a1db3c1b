use std::sync::Arc;

use crate::domain::{DocumentId, Passage};
use crate::error::{CyBotError, Result};
use crate::index::{DocumentIndexRegistry, VectorIndex};
use crate::ports::{EmbeddingGenerator, TextExtractor};
use crate::services::TextChunker;

/// Turns an uploaded document into a registered ephemeral index.
///
/// The registry entry is written last, so a failure at any earlier step
/// leaves nothing behind and a cancelled ingest registers nothing.
pub struct IngestionService {
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingGenerator>,
    chunker: TextChunker,
    registry: Arc<DocumentIndexRegistry>,
}

impl IngestionService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingGenerator>,
        chunker: TextChunker,
        registry: Arc<DocumentIndexRegistry>,
    ) -> Self {
        Self {
            extractor,
            embedder,
            chunker,
            registry,
        }
    }

    pub async fn ingest(&self, raw: &[u8]) -> Result<DocumentId> {
        let text = self.extractor.extract_text(raw).await?;
        let id = DocumentId::generate();

        let index = self.build_index(&id, &text).await?;
        let passages = index.len();
        self.registry.register(id.clone(), Arc::new(index))?;

        tracing::info!(document = %id, passages, bytes = raw.len(), "ingested document");
        Ok(id)
    }

    async fn build_index(&self, id: &DocumentId, text: &str) -> Result<VectorIndex> {
        let dimension = self.embedder.dimension();
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            tracing::info!(document = %id, "document has no extractable text, registering empty index");
            return Ok(VectorIndex::empty(dimension));
        }

        let inputs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self
            .embedder
            .embed_batch(&inputs)
            .await
            .map_err(|e| CyBotError::Ingestion(format!("could not embed document: {e}")))?;

        let passages = chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| Passage::document(chunk, id.clone(), i))
            .collect();

        VectorIndex::build(dimension, passages, vectors)
            .map_err(|e| CyBotError::Ingestion(format!("could not index document: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PlainTextExtractor;
    use crate::testing::{FailingEmbedder, HashEmbedder};

    fn service(embedder: Arc<dyn EmbeddingGenerator>) -> (IngestionService, Arc<DocumentIndexRegistry>) {
        let registry = Arc::new(DocumentIndexRegistry::new());
        let service = IngestionService::new(
            Arc::new(PlainTextExtractor),
            embedder,
            TextChunker::default(),
            Arc::clone(&registry),
        );
        (service, registry)
    }

    #[tokio::test]
    async fn test_ingest_registers_tagged_passages() {
        let (service, registry) = service(Arc::new(HashEmbedder::new(64)));
        let id = service
            .ingest(b"Section 66C deals with identity theft.")
            .await
            .unwrap();

        let index = registry.lookup(&id).unwrap();
        assert_eq!(index.len(), 1);
        let (passage, _) = index.iter().next().unwrap();
        assert_eq!(passage.document_id(), Some(&id));
        assert_eq!(passage.content, "Section 66C deals with identity theft.");
    }

    #[tokio::test]
    async fn test_empty_document_registers_empty_index() {
        let (service, registry) = service(Arc::new(HashEmbedder::new(64)));
        let id = service.ingest(b"   \n\n ").await.unwrap();
        assert!(registry.lookup(&id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_input_registers_nothing() {
        let (service, registry) = service(Arc::new(HashEmbedder::new(64)));
        let err = service.ingest(&[0x00, 0xff, 0x13]).await.unwrap_err();
        assert!(matches!(err, CyBotError::Ingestion(_)));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_registers_nothing() {
        let (service, registry) = service(Arc::new(FailingEmbedder));
        let err = service.ingest(b"some readable text").await.unwrap_err();
        assert!(matches!(err, CyBotError::Ingestion(_)));
        assert_eq!(
            err.to_string(),
            "Ingestion failed: could not embed document: Embedding service error: service offline"
        );
        assert!(registry.is_empty());
    }
}
