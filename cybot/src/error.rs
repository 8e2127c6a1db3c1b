use thiserror::Error;

use crate::domain::DocumentId;

#[derive(Error, Debug)]
pub enum CyBotError {
    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Intent classification failed: {0}")]
    IntentClassification(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Reranker error: {0}")]
    Rerank(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Document already registered: {0}")]
    DocumentExists(DocumentId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CyBotError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Ingestion(_) | Self::DocumentExists(_) => 1,
            Self::Retrieval(_) | Self::Index(_) => 2,
            Self::Config(_) => 3,
            Self::Generation(_) | Self::Http(_) => 4,
            Self::Embedding(_) | Self::Rerank(_) | Self::IntentClassification(_) => 5,
            Self::Io(_) | Self::Serialization(_) => 10,
        }
    }
}

pub type Result<T> = std::result::Result<T, CyBotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingestion_message_covers_every_step() {
        let err = CyBotError::Ingestion("could not embed document: service offline".to_string());
        assert_eq!(err.to_string(), "Ingestion failed: could not embed document: service offline");
        assert_eq!(err.exit_code(), 1);
    }
}
