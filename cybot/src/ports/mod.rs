pub mod embed;
pub mod extract;
pub mod generate;
pub mod intent;
pub mod rerank;

pub use embed::EmbeddingGenerator;
pub use extract::TextExtractor;
pub use generate::TextGenerator;
pub use intent::IntentClassifier;
pub use rerank::Reranker;
