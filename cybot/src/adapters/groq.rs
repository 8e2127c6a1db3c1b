//! Groq chat-completions client (OpenAI-compatible wire format).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CyBotError, Result};
use crate::ports::TextGenerator;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GroqGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<Self> {
        let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            CyBotError::Config("GROQ_API_KEY is not set (generation.api_key)".to_string())
        })?;

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            temperature,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        }
    }
}

fn first_reply(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| CyBotError::Generation("response contained no choices".to_string()))
}

#[async_trait]
impl TextGenerator for GroqGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| CyBotError::Generation(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CyBotError::Generation(format!("{url} returned {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CyBotError::Generation(format!("malformed chat response: {e}")))?;
        first_reply(body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
