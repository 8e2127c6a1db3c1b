pub mod chunker;
pub mod ingestion;
pub mod knowledge_base;
pub mod orchestrator;
pub mod prompt;
pub mod retrieval;

pub use chunker::TextChunker;
pub use ingestion::IngestionService;
pub use knowledge_base::{KnowledgeBaseBuilder, LawSection, load_sections};
pub use orchestrator::{Answer, QueryFailure, QueryStage, RagOrchestrator};
pub use prompt::{GenerationRequest, PromptAssembler, SYSTEM_INSTRUCTIONS};
pub use retrieval::RetrievalService;
