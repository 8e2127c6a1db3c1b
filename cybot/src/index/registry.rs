//! Concurrent map from document id to its ephemeral vector index.
//!
//! Indexes are stored behind an `Arc`: `lookup` hands out a clone, so
//! evicting an id only drops the registry's reference and a search already
//! holding the index finishes against the intact structure.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::DocumentId;
use crate::error::{CyBotError, Result};
use crate::index::VectorIndex;

#[derive(Default)]
pub struct DocumentIndexRegistry {
    indexes: DashMap<DocumentId, Arc<VectorIndex>>,
}

impl DocumentIndexRegistry {
    pub fn new() -> Self {
        Self {
            indexes: DashMap::new(),
        }
    }

    /// Makes a fully built index visible under `id`. Fails if `id` is taken.
    pub fn register(&self, id: DocumentId, index: Arc<VectorIndex>) -> Result<()> {
        match self.indexes.entry(id) {
            Entry::Occupied(entry) => Err(CyBotError::DocumentExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(document_id = %entry.key(), passages = index.len(), "registered document index");
                entry.insert(index);
                Ok(())
            }
        }
    }

    /// An unknown id means "no document context", not an error.
    pub fn lookup(&self, id: &DocumentId) -> Option<Arc<VectorIndex>> {
        self.indexes.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Idempotent; returns whether an index was removed.
    pub fn evict(&self, id: &DocumentId) -> bool {
        let removed = self.indexes.remove(id).is_some();
        if removed {
            tracing::debug!(document_id = %id, "evicted document index");
        }
        removed
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.indexes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
