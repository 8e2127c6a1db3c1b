//! Offline build of the persistent knowledge-base index from a JSON corpus
//! of law sections.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::domain::{Passage, PassageMetadata};
use crate::error::{CyBotError, Result};
use crate::index::VectorIndex;
use crate::ports::EmbeddingGenerator;
use crate::services::TextChunker;

#[derive(Debug, Clone, Deserialize)]
pub struct LawSection {
    #[serde(default, deserialize_with = "label")]
    pub chapter: Option<String>,
    #[serde(default, deserialize_with = "label")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "label")]
    pub section_name: Option<String>,
    #[serde(default)]
    pub description: String,
}

// Labels arrive as strings or bare numbers; "N/A" and blanks mean absent.
fn label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let text = match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("n/a") {
        Ok(None)
    } else {
        Ok(Some(text.to_string()))
    }
}

pub fn load_sections(path: &Path) -> Result<Vec<LawSection>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CyBotError::Index(format!("invalid law corpus {}: {e}", path.display())))
}

pub struct KnowledgeBaseBuilder {
    embedder: Arc<dyn EmbeddingGenerator>,
    chunker: TextChunker,
    batch_size: usize,
}

impl KnowledgeBaseBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingGenerator>, chunker: TextChunker, batch_size: usize) -> Self {
        Self {
            embedder,
            chunker,
            batch_size: batch_size.max(1),
        }
    }

    /// Chunks every section with a description. Fails if none has one.
    pub fn passages(&self, sections: &[LawSection]) -> Result<Vec<Passage>> {
        let mut passages = Vec::new();
        let mut used = 0;

        for section in sections.iter().filter(|s| !s.description.trim().is_empty()) {
            used += 1;
            for (chunk_index, chunk) in self.chunker.chunk(&section.description).into_iter().enumerate() {
                let metadata = PassageMetadata {
                    chapter: section.chapter.clone(),
                    section: section.section.clone(),
                    section_name: section.section_name.clone(),
                    chunk_index,
                };
                passages.push(Passage::knowledge_base(chunk, metadata));
            }
        }

        if passages.is_empty() {
            return Err(CyBotError::Index(
                "no law section has a description; nothing to index".to_string(),
            ));
        }

        tracing::info!(
            sections = used,
            skipped = sections.len() - used,
            passages = passages.len(),
            "chunked law sections"
        );
        Ok(passages)
    }

    /// Embeds in batches, calling `on_batch` with the number of passages done.
    pub async fn build(
        &self,
        passages: Vec<Passage>,
        mut on_batch: impl FnMut(usize) + Send,
    ) -> Result<VectorIndex> {
        let mut vectors = Vec::with_capacity(passages.len());

        for batch in passages.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|p| p.content.as_str()).collect();
            vectors.extend(self.embedder.embed_batch(&texts).await?);
            on_batch(vectors.len());
        }

        VectorIndex::build(self.embedder.dimension(), passages, vectors)
    }
}
