//! Ollama HTTP API clients.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CyBotError, Result};
use crate::ports::{EmbeddingGenerator, TextGenerator};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimension: usize,
    batch_size: usize,
}

impl OllamaEmbedder {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
        batch_size: usize,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
            batch_size: batch_size.max(1),
        })
    }

    async fn embed_request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| CyBotError::Embedding(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CyBotError::Embedding(format!("{url} returned {status}: {body}")));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| CyBotError::Embedding(format!("malformed embed response: {e}")))?;
        self.check_shape(texts.len(), body.embeddings)
    }

    fn check_shape(&self, expected: usize, embeddings: Vec<Vec<f32>>) -> Result<Vec<Vec<f32>>> {
        if embeddings.len() != expected {
            return Err(CyBotError::Embedding(format!(
                "asked for {expected} embeddings, got {}",
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(CyBotError::Embedding(format!(
                "model {} returned dimension {}, configured {}",
                self.model,
                bad.len(),
                self.dimension
            )));
        }
        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingGenerator for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_request(&[text])
            .await?
            .pop()
            .ok_or_else(|| CyBotError::Embedding("empty embed response".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_request(batch).await?);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OllamaGenerator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: GenerateOptions {
                    temperature: self.temperature,
                },
            })
            .send()
            .await
            .map_err(|e| CyBotError::Generation(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CyBotError::Generation(format!("{url} returned {status}: {body}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CyBotError::Generation(format!("malformed generate response: {e}")))?;
        Ok(body.response.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_request_shape() {
        let body = serde_json::to_value(EmbedRequest {
            model: "nomic-embed-text",
            input: &["a", "b"],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "model": "nomic-embed-text", "input": ["a", "b"] }));
    }

    #[test]
    fn test_check_shape_rejects_wrong_dimension() {
        let embedder = OllamaEmbedder::new("http://localhost:11434/", "m", 3, 8).unwrap();
        assert_eq!(embedder.endpoint, "http://localhost:11434");
        assert!(embedder.check_shape(1, vec![vec![0.0; 3]]).is_ok());
        assert!(embedder.check_shape(1, vec![vec![0.0; 2]]).is_err());
        assert!(embedder.check_shape(2, vec![vec![0.0; 3]]).is_err());
    }

    #[test]
    fn test_generate_request_disables_streaming() {
        let body = serde_json::to_value(GenerateRequest {
            model: "llama3.1",
            prompt: "hi",
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        })
        .unwrap();
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.5);
    }
}
