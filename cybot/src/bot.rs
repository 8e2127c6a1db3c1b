//! Startup-phase composition of the whole pipeline.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{
    AutoExtractor, GroqGenerator, LexicalReranker, LinearIntentClassifier, OllamaEmbedder,
    OllamaGenerator, PdfTextExtractor, UnavailableIntentClassifier,
};
use crate::config::{Config, EmbeddingProvider, GenerationProvider, RerankerProvider};
use crate::domain::DocumentId;
use crate::error::{CyBotError, Result};
use crate::index::{DocumentIndexRegistry, VectorIndex, load_index};
use crate::ports::{EmbeddingGenerator, IntentClassifier, Reranker, TextExtractor, TextGenerator};
use crate::services::{
    Answer, IngestionService, PromptAssembler, QueryFailure, RagOrchestrator, RetrievalService,
    TextChunker,
};

/// Explicit components for [`CyBot::new`].
pub struct CyBotParts {
    pub knowledge_base: Arc<VectorIndex>,
    pub embedder: Arc<dyn EmbeddingGenerator>,
    pub generator: Arc<dyn TextGenerator>,
    pub reranker: Arc<dyn Reranker>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub extractor: Arc<dyn TextExtractor>,
    pub chunker: TextChunker,
    pub prompts: PromptAssembler,
    pub top_k_retrieve: usize,
    pub top_k_final: usize,
    pub generation_timeout: Duration,
}

impl CyBotParts {
    /// Parts with default chunking, prompt, retrieval depth, and timeout.
    pub fn new(
        knowledge_base: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingGenerator>,
        generator: Arc<dyn TextGenerator>,
        reranker: Arc<dyn Reranker>,
        classifier: Arc<dyn IntentClassifier>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            knowledge_base,
            embedder,
            generator,
            reranker,
            classifier,
            extractor,
            chunker: TextChunker::default(),
            prompts: PromptAssembler::default(),
            top_k_retrieve: 5,
            top_k_final: 3,
            generation_timeout: Duration::from_secs(60),
        }
    }
}

pub struct CyBot {
    registry: Arc<DocumentIndexRegistry>,
    ingestion: IngestionService,
    orchestrator: RagOrchestrator,
}

impl CyBot {
    pub fn new(parts: CyBotParts) -> Self {
        let registry = Arc::new(DocumentIndexRegistry::new());

        let ingestion = IngestionService::new(
            parts.extractor,
            Arc::clone(&parts.embedder),
            parts.chunker,
            Arc::clone(&registry),
        );
        let retrieval = RetrievalService::new(
            parts.knowledge_base,
            Arc::clone(&registry),
            parts.embedder,
            parts.reranker,
        );
        let orchestrator = RagOrchestrator::new(parts.classifier, retrieval, parts.prompts, parts.generator)
            .with_top_k(parts.top_k_retrieve, parts.top_k_final)
            .with_generation_timeout(parts.generation_timeout);

        Self {
            registry,
            ingestion,
            orchestrator,
        }
    }

    /// Loads the persistent index and builds every adapter named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = build_embedder(config)?;

        let loaded = load_index(&config.knowledge_base.index_path)?;
        if loaded.model != embedder.model_name() {
            tracing::warn!(
                index_model = %loaded.model,
                embedder_model = %embedder.model_name(),
                "knowledge-base index was built with a different embedding model"
            );
        }
        if loaded.index.dimension() != embedder.dimension() {
            return Err(CyBotError::Config(format!(
                "knowledge-base index has dimension {}, embedding.dimension is {}",
                loaded.index.dimension(),
                embedder.dimension()
            )));
        }

        let mut parts = CyBotParts::new(
            Arc::new(loaded.index),
            embedder,
            build_generator(config)?,
            build_reranker(config)?,
            build_classifier(config),
            Arc::new(AutoExtractor::new(PdfTextExtractor::default())),
        );
        parts.chunker = TextChunker::new(config.chunking.size, config.chunking.overlap)?;
        parts.top_k_retrieve = config.retrieval.top_k_retrieve;
        parts.top_k_final = config.retrieval.top_k_final;
        parts.generation_timeout = Duration::from_secs(config.generation.timeout_secs);

        tracing::info!(
            passages = parts.knowledge_base.len(),
            generator = %parts.generator.model_name(),
            reranker = %parts.reranker.name(),
            "cy-bot ready"
        );
        Ok(Self::new(parts))
    }

    /// Always returns text; failures are rendered as `[Backend Error] ...`.
    pub async fn answer(&self, query: &str, active_document: Option<&DocumentId>) -> String {
        self.orchestrator.answer(query, active_document).await
    }

    pub async fn try_answer(
        &self,
        query: &str,
        active_document: Option<&DocumentId>,
    ) -> std::result::Result<Answer, QueryFailure> {
        self.orchestrator.try_answer(query, active_document).await
    }

    pub async fn ingest_document(&self, raw: &[u8]) -> Result<DocumentId> {
        self.ingestion.ingest(raw).await
    }

    /// Idempotent. In-flight searches keep their own handle to the index.
    pub fn evict_document(&self, id: &DocumentId) {
        if self.registry.evict(id) {
            tracing::info!(document = %id, "evicted document");
        }
    }

    pub fn registry(&self) -> &DocumentIndexRegistry {
        &self.registry
    }

    pub fn knowledge_base(&self) -> &VectorIndex {
        self.orchestrator.retrieval().knowledge_base()
    }
}

pub fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingGenerator>> {
    let embedding = &config.embedding;
    match embedding.provider {
        EmbeddingProvider::Ollama => Ok(Arc::new(OllamaEmbedder::new(
            &embedding.endpoint,
            &embedding.model,
            embedding.dimension,
            embedding.batch_size,
        )?)),
        #[cfg(feature = "fastembed")]
        EmbeddingProvider::FastEmbed => Ok(Arc::new(crate::adapters::FastEmbedEmbedder::new(
            &embedding.model,
        )?)),
        #[cfg(not(feature = "fastembed"))]
        EmbeddingProvider::FastEmbed => Err(CyBotError::Config(
            "embedding.provider = \"fastembed\" needs the `fastembed` feature".to_string(),
        )),
    }
}

fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let generation = &config.generation;
    match generation.provider {
        GenerationProvider::Groq => Ok(Arc::new(GroqGenerator::new(
            &generation.endpoint,
            generation.api_key.clone(),
            &generation.model,
            generation.temperature,
        )?)),
        GenerationProvider::Ollama => Ok(Arc::new(OllamaGenerator::new(
            &generation.endpoint,
            &generation.model,
            generation.temperature,
        )?)),
    }
}

fn build_reranker(config: &Config) -> Result<Arc<dyn Reranker>> {
    match config.reranker.provider {
        RerankerProvider::Lexical => Ok(Arc::new(LexicalReranker)),
        #[cfg(feature = "fastembed")]
        RerankerProvider::FastEmbed => Ok(Arc::new(crate::adapters::CrossEncoderReranker::new(
            &config.reranker.model,
        )?)),
        #[cfg(not(feature = "fastembed"))]
        RerankerProvider::FastEmbed => Err(CyBotError::Config(
            "reranker.provider = \"fastembed\" needs the `fastembed` feature".to_string(),
        )),
    }
}

fn build_classifier(config: &Config) -> Arc<dyn IntentClassifier> {
    let path = &config.intent.model_path;
    match LinearIntentClassifier::load(path) {
        Ok(classifier) => {
            tracing::info!(path = %path.display(), labels = classifier.labels().len(), "loaded intent classifier");
            Arc::new(classifier)
        }
        Err(e) => {
            tracing::warn!(error = %e, "intent classifier unavailable, queries will use the placeholder intent");
            Arc::new(UnavailableIntentClassifier::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::save_index;
    use crate::testing::{FixedIntent, HashEmbedder, ScriptedGenerator};
    use crate::adapters::PlainTextExtractor;

    fn bot(generator: Arc<ScriptedGenerator>) -> CyBot {
        CyBot::new(CyBotParts::new(
            Arc::new(VectorIndex::empty(32)),
            Arc::new(HashEmbedder::new(32)),
            generator,
            Arc::new(LexicalReranker),
            Arc::new(FixedIntent("legal_query")),
            Arc::new(PlainTextExtractor),
        ))
    }

    #[tokio::test]
    async fn test_ingest_then_evict() {
        let bot = bot(Arc::new(ScriptedGenerator::new("ok")));
        let id = bot.ingest_document(b"Section 66C deals with identity theft.").await.unwrap();
        assert!(bot.registry().contains(&id));

        bot.evict_document(&id);
        bot.evict_document(&id);
        assert!(bot.registry().lookup(&id).is_none());
    }

    #[tokio::test]
    async fn test_answer_uses_active_document() {
        let generator = Arc::new(ScriptedGenerator::new("<p>According to the document you provided...</p>"));
        let bot = bot(Arc::clone(&generator));
        let id = bot.ingest_document(b"Section 66C deals with identity theft.").await.unwrap();

        let answer = bot.answer("What is Section 66C about?", Some(&id)).await;
        assert!(!answer.is_empty());
        assert!(generator.prompts()[0].contains("[Uploaded document]\nSection 66C deals with identity theft."));
    }

    #[test]
    fn test_from_config_requires_index_file() {
        let mut config = Config::default();
        config.knowledge_base.index_path = "/nonexistent/kb_index.json".into();
        config.generation.api_key = Some("gsk_test".to_string());
        let err = CyBot::from_config(&config).err().unwrap();
        assert!(matches!(err, CyBotError::Retrieval(_)));
    }

    #[test]
    fn test_from_config_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        save_index(&path, &VectorIndex::empty(16), "nomic-embed-text").unwrap();

        let mut config = Config::default();
        config.knowledge_base.index_path = path;
        config.generation.api_key = Some("gsk_test".to_string());
        let err = CyBot::from_config(&config).err().unwrap();
        assert!(matches!(err, CyBotError::Config(_)));
    }

    #[test]
    fn test_missing_intent_model_degrades() {
        let mut config = Config::default();
        config.intent.model_path = "/nonexistent/intent.json".into();
        assert!(build_classifier(&config).classify("hello").is_err());
    }
}
