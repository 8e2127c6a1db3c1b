use serde::{Deserialize, Serialize};

use super::Passage;

/// A passage paired with a relevance signal. Higher is always better;
/// scores are only comparable within one query's result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

impl ScoredPassage {
    pub const fn new(passage: Passage, score: f32) -> Self {
        Self { passage, score }
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub query: String,
    pub top_k_retrieve: usize,
    pub top_k_final: usize,
}

impl RetrievalQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k_retrieve: 5,
            top_k_final: 3,
        }
    }

    #[must_use]
    pub const fn with_top_k_retrieve(mut self, k: usize) -> Self {
        self.top_k_retrieve = k;
        self
    }

    #[must_use]
    pub const fn with_top_k_final(mut self, k: usize) -> Self {
        self.top_k_final = k;
        self
    }
}
