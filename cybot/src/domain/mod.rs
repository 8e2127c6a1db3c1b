pub mod id;
pub mod intent;
pub mod passage;
pub mod retrieval;

pub use id::DocumentId;
pub use intent::IntentLabel;
pub use passage::{Passage, PassageMetadata, PassageSource};
pub use retrieval::{RetrievalQuery, ScoredPassage};
