//! Local ONNX models via fastembed (`fastembed` feature).

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use fastembed::{
    EmbeddingModel, InitOptions, RerankInitOptions, RerankerModel, TextEmbedding, TextRerank,
};

use crate::error::{CyBotError, Result};
use crate::ports::{EmbeddingGenerator, Reranker};

fn embedding_model(name: &str) -> Result<(EmbeddingModel, usize)> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Ok((EmbeddingModel::AllMiniLML6V2, 384))
        }
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        "nomic-embed-text-v1.5" => Ok((EmbeddingModel::NomicEmbedTextV15, 768)),
        other => Err(CyBotError::Config(format!("unsupported local embedding model: {other}"))),
    }
}

fn reranker_model(name: &str) -> Result<RerankerModel> {
    match name.to_lowercase().as_str() {
        "bge-reranker-base" => Ok(RerankerModel::BGERerankerBase),
        "jina-reranker-v1-turbo-en" => Ok(RerankerModel::JINARerankerV1TurboEn),
        other => Err(CyBotError::Config(format!("unsupported reranker model: {other}"))),
    }
}

pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedEmbedder {
    pub fn new(model_name: &str) -> Result<Self> {
        let (model, dimension) = embedding_model(model_name)?;
        let embedding = TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(false))
            .map_err(|e| CyBotError::Embedding(format!("failed to load {model_name}: {e}")))?;
        tracing::info!(model = model_name, dimension, "loaded local embedding model");

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            model_name: model_name.to_string(),
            dimension,
        })
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let model = model.lock().unwrap_or_else(PoisonError::into_inner);
            model
                .embed(texts, None)
                .map_err(|e| CyBotError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| CyBotError::Embedding(format!("embedding task failed: {e}")))?
    }
}

#[async_trait]
impl EmbeddingGenerator for FastEmbedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.run(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| CyBotError::Embedding("model returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.run(texts.iter().map(|t| (*t).to_string()).collect()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Cross-encoder scoring of (query, passage) pairs.
pub struct CrossEncoderReranker {
    model: Arc<Mutex<TextRerank>>,
    model_name: String,
}

impl CrossEncoderReranker {
    pub fn new(model_name: &str) -> Result<Self> {
        let reranker = TextRerank::try_new(
            RerankInitOptions::new(reranker_model(model_name)?).with_show_download_progress(false),
        )
        .map_err(|e| CyBotError::Rerank(format!("failed to load {model_name}: {e}")))?;
        tracing::info!(model = model_name, "loaded cross-encoder reranker");

        Ok(Self {
            model: Arc::new(Mutex::new(reranker)),
            model_name: model_name.to_string(),
        })
    }
}

#[async_trait]
impl Reranker for CrossEncoderReranker {
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let query = query.to_string();
        let documents: Vec<String> = passages.iter().map(|p| (*p).to_string()).collect();
        let count = documents.len();

        let results = tokio::task::spawn_blocking(move || {
            let model = model.lock().unwrap_or_else(PoisonError::into_inner);
            let documents: Vec<&str> = documents.iter().map(String::as_str).collect();
            model
                .rerank(query.as_str(), documents, false, None)
                .map_err(|e| CyBotError::Rerank(e.to_string()))
        })
        .await
        .map_err(|e| CyBotError::Rerank(format!("rerank task failed: {e}")))??;

        Ok(in_input_order(
            count,
            results.into_iter().map(|result| (result.index, result.score)),
        ))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// fastembed returns `(index, score)` sorted by score; put scores back at
/// their input positions. Positions with no result score `-inf`.
fn in_input_order(count: usize, results: impl IntoIterator<Item = (usize, f32)>) -> Vec<f32> {
    let mut scores = vec![f32::NEG_INFINITY; count];
    for (index, score) in results {
        if let Some(slot) = scores.get_mut(index) {
            *slot = score;
        }
    }
    scores
}
