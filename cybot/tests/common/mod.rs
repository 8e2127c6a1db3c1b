#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cybot::adapters::{LexicalReranker, PlainTextExtractor};
use cybot::domain::IntentLabel;
use cybot::error::{CyBotError, Result};
use cybot::index::VectorIndex;
use cybot::ports::{EmbeddingGenerator, IntentClassifier, Reranker, TextGenerator};
use cybot::{CyBot, CyBotParts};
use tokio::sync::Notify;

pub const DIM: usize = 64;

/// Token bag hashed into `DIM` buckets.
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIM];
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 2)
            .map(str::to_lowercase);
        for word in words {
            let hash = word.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
                (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
            vector[(hash % DIM as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingGenerator for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn model_name(&self) -> &str {
        "hash-bag"
    }
}

/// Stands in for the LLM: follows the scope rule by looking at the question.
pub struct ScopedGenerator {
    prompts: Mutex<Vec<String>>,
}

impl ScopedGenerator {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts().pop().unwrap()
    }
}

const IN_SCOPE: [&str; 6] = ["section", "cyber", "law", "theft", "hacking", "password"];

#[async_trait]
impl TextGenerator for ScopedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let question = prompt
            .lines()
            .find_map(|line| line.strip_prefix("Question: "))
            .unwrap_or_default()
            .to_lowercase();

        if IN_SCOPE.iter().any(|word| question.contains(word)) {
            Ok("<p>Based on Kerala's cyber laws...</p>".to_string())
        } else {
            Ok("<p>I'm sorry, that question is outside the scope of Kerala's cyber laws, so I can't help with it.</p>".to_string())
        }
    }

    fn model_name(&self) -> &str {
        "scoped"
    }
}

pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(CyBotError::Generation("connection refused".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

pub struct SlowGenerator(pub Duration);

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_string())
    }

    fn model_name(&self) -> &str {
        "slow"
    }
}

/// Lexical scores, but parks every call until released.
pub struct GatedReranker {
    pub entered: Notify,
    pub release: Notify,
}

impl GatedReranker {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl Reranker for GatedReranker {
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        self.entered.notify_one();
        self.release.notified().await;
        LexicalReranker.score(query, passages).await
    }

    fn name(&self) -> &str {
        "gated"
    }
}

pub struct FixedIntent;

impl IntentClassifier for FixedIntent {
    fn classify(&self, _query: &str) -> Result<IntentLabel> {
        Ok(IntentLabel::new("legal_query"))
    }
}

pub fn parts(
    knowledge_base: VectorIndex,
    generator: Arc<dyn TextGenerator>,
    reranker: Arc<dyn Reranker>,
) -> CyBotParts {
    CyBotParts::new(
        Arc::new(knowledge_base),
        Arc::new(HashEmbedder),
        generator,
        reranker,
        Arc::new(FixedIntent),
        Arc::new(PlainTextExtractor),
    )
}

pub fn bot(knowledge_base: VectorIndex, generator: Arc<dyn TextGenerator>) -> CyBot {
    CyBot::new(parts(knowledge_base, generator, Arc::new(LexicalReranker)))
}
