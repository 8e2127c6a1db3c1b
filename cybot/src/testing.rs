//! Deterministic in-process doubles for the ports.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::adapters::intent::tokenize;
use crate::domain::IntentLabel;
use crate::error::{CyBotError, Result};
use crate::ports::{EmbeddingGenerator, IntentClassifier, Reranker, TextGenerator};

/// Bag-of-words vectors: each token lands in a bucket chosen by FNV-1a.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        for token in tokenize(text) {
            let hash = token.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
                (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hash % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingGenerator for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hash-bag"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingGenerator for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(CyBotError::Embedding("service offline".to_string()))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Err(CyBotError::Embedding("service offline".to_string()))
    }

    fn dimension(&self) -> usize {
        8
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

pub struct FailingReranker;

#[async_trait]
impl Reranker for FailingReranker {
    async fn score(&self, _query: &str, _passages: &[&str]) -> Result<Vec<f32>> {
        Err(CyBotError::Rerank("model not loaded".to_string()))
    }

    fn name(&self) -> &str {
        "failing-reranker"
    }
}

/// Replies with a fixed answer and keeps every prompt it was sent.
pub struct ScriptedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(CyBotError::Generation("503 Service Unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

pub struct FixedIntent(pub &'static str);

impl IntentClassifier for FixedIntent {
    fn classify(&self, _query: &str) -> Result<IntentLabel> {
        Ok(IntentLabel::new(self.0))
    }
}
