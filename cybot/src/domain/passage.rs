use serde::{Deserialize, Serialize};

use super::DocumentId;

/// A retrievable unit of text. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    pub source: PassageSource,
    #[serde(default)]
    pub metadata: PassageMetadata,
}

impl Passage {
    pub fn knowledge_base(content: impl Into<String>, metadata: PassageMetadata) -> Self {
        Self {
            content: content.into(),
            source: PassageSource::KnowledgeBase,
            metadata,
        }
    }

    pub fn document(content: impl Into<String>, document_id: DocumentId, chunk_index: usize) -> Self {
        Self {
            content: content.into(),
            source: PassageSource::Document { document_id },
            metadata: PassageMetadata {
                chunk_index,
                ..PassageMetadata::default()
            },
        }
    }

    pub const fn document_id(&self) -> Option<&DocumentId> {
        match &self.source {
            PassageSource::Document { document_id } => Some(document_id),
            PassageSource::KnowledgeBase => None,
        }
    }

    /// Short provenance tag placed in front of the passage in a prompt.
    pub fn provenance(&self) -> String {
        match &self.source {
            PassageSource::Document { .. } => "[Uploaded document]".to_string(),
            PassageSource::KnowledgeBase => match (&self.metadata.section, &self.metadata.section_name) {
                (Some(section), Some(name)) => format!("[Kerala cyber laws — Section {section}: {name}]"),
                (Some(section), None) => format!("[Kerala cyber laws — Section {section}]"),
                _ => "[Kerala cyber laws]".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassageSource {
    KnowledgeBase,
    Document { document_id: DocumentId },
}

/// Chapter/section labels are only set on knowledge-base passages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMetadata {
    pub chapter: Option<String>,
    pub section: Option<String>,
    pub section_name: Option<String>,
    #[serde(default)]
    pub chunk_index: usize,
}
