//! Exact nearest-neighbour search over passage embeddings.

use crate::domain::{Passage, ScoredPassage};
use crate::error::{CyBotError, Result};

#[derive(Debug, Clone)]
struct IndexEntry {
    passage: Passage,
    vector: Vec<f32>,
}

/// Immutable after construction; safe to share behind an `Arc` across tasks.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub const fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn build(dimension: usize, passages: Vec<Passage>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if passages.len() != vectors.len() {
            return Err(CyBotError::Index(format!(
                "{} passages but {} vectors",
                passages.len(),
                vectors.len()
            )));
        }

        let entries = passages
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(position, (passage, vector))| {
                if vector.len() == dimension {
                    Ok(IndexEntry { passage, vector })
                } else {
                    Err(CyBotError::Index(format!(
                        "vector {position} has dimension {}, expected {dimension}",
                        vector.len()
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { dimension, entries })
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Passage, &[f32])> {
        self.entries
            .iter()
            .map(|entry| (&entry.passage, entry.vector.as_slice()))
    }

    /// Returns at most `k` passages by decreasing cosine similarity. Ties
    /// keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredPassage>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(CyBotError::Index(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(query, &entry.vector)))
            .collect();

        // sort_by is stable, so equal scores stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k.min(self.entries.len()));

        Ok(scored
            .into_iter()
            .map(|(position, score)| ScoredPassage::new(self.entries[position].passage.clone(), score))
            .collect())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
