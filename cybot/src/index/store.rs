//! On-disk format of the persistent knowledge-base index.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Passage;
use crate::error::{CyBotError, Result};
use crate::index::VectorIndex;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    model: String,
    dimension: usize,
    built_at: DateTime<Utc>,
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    passage: Passage,
    vector: Vec<f32>,
}

#[derive(Debug)]
pub struct LoadedIndex {
    pub index: VectorIndex,
    pub model: String,
    pub built_at: DateTime<Utc>,
}

pub fn save_index(path: &Path, index: &VectorIndex, model: &str) -> Result<()> {
    let file = IndexFile {
        version: FORMAT_VERSION,
        model: model.to_string(),
        dimension: index.dimension(),
        built_at: Utc::now(),
        entries: index
            .iter()
            .map(|(passage, vector)| StoredEntry {
                passage: passage.clone(),
                vector: vector.to_vec(),
            })
            .collect(),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string(&file)?)?;
    tracing::info!(
        path = %path.display(),
        passages = index.len(),
        "saved knowledge-base index"
    );
    Ok(())
}

pub fn load_index(path: &Path) -> Result<LoadedIndex> {
    if !path.exists() {
        return Err(CyBotError::Retrieval(format!(
            "persistent index unavailable: {} does not exist",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let file: IndexFile = serde_json::from_str(&content)
        .map_err(|e| CyBotError::Index(format!("corrupt index file {}: {e}", path.display())))?;

    if file.version != FORMAT_VERSION {
        return Err(CyBotError::Index(format!(
            "unsupported index format version {} (expected {FORMAT_VERSION})",
            file.version
        )));
    }

    let (passages, vectors): (Vec<_>, Vec<_>) = file
        .entries
        .into_iter()
        .map(|entry| (entry.passage, entry.vector))
        .unzip();
    let index = VectorIndex::build(file.dimension, passages, vectors)?;

    tracing::info!(
        path = %path.display(),
        passages = index.len(),
        model = %file.model,
        built_at = %file.built_at,
        "loaded knowledge-base index"
    );

    Ok(LoadedIndex {
        index,
        model: file.model,
        built_at: file.built_at,
    })
}
