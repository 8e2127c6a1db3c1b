use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{DocumentId, IntentLabel, RetrievalQuery};
use crate::error::CyBotError;
use crate::ports::{IntentClassifier, TextGenerator};
use crate::services::{PromptAssembler, RetrievalService};

/// Where a query is in the answer pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Received,
    IntentResolved,
    Retrieved,
    Reranked,
    PromptBuilt,
    Answered,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::IntentResolved => "intent",
            Self::Retrieved => "retrieval",
            Self::Reranked => "rerank",
            Self::PromptBuilt => "prompt",
            Self::Answered => "generation",
        };
        f.write_str(name)
    }
}

/// Terminal failure. `stage` is the stage that was being entered.
#[derive(Debug)]
pub struct QueryFailure {
    pub stage: QueryStage,
    pub error: CyBotError,
}

impl QueryFailure {
    const fn at(stage: QueryStage, error: CyBotError) -> Self {
        Self { stage, error }
    }
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Backend Error] {}: {}", self.stage, self.error)
    }
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub intent: IntentLabel,
    pub passages_used: usize,
}

pub struct RagOrchestrator {
    classifier: Arc<dyn IntentClassifier>,
    retrieval: RetrievalService,
    prompts: PromptAssembler,
    generator: Arc<dyn TextGenerator>,
    top_k_retrieve: usize,
    top_k_final: usize,
    generation_timeout: Duration,
}

impl RagOrchestrator {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        retrieval: RetrievalService,
        prompts: PromptAssembler,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            classifier,
            retrieval,
            prompts,
            generator,
            top_k_retrieve: 5,
            top_k_final: 3,
            generation_timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub const fn with_top_k(mut self, retrieve: usize, keep: usize) -> Self {
        self.top_k_retrieve = retrieve;
        self.top_k_final = keep;
        self
    }

    #[must_use]
    pub const fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub const fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    /// Never fails: errors come back as a `[Backend Error]` string.
    pub async fn answer(&self, query: &str, active_document: Option<&DocumentId>) -> String {
        match self.try_answer(query, active_document).await {
            Ok(answer) => answer.text,
            Err(failure) => {
                tracing::warn!(stage = %failure.stage, error = %failure.error, "query failed");
                failure.to_string()
            }
        }
    }

    pub async fn try_answer(
        &self,
        query: &str,
        active_document: Option<&DocumentId>,
    ) -> std::result::Result<Answer, QueryFailure> {
        let mut stage = QueryStage::Received;
        tracing::debug!(%stage, document = ?active_document.map(DocumentId::as_str), "query received");

        let intent = self.resolve_intent(query);
        stage = advance(stage, QueryStage::IntentResolved);

        let retrieval_query = RetrievalQuery::new(query)
            .with_top_k_retrieve(self.top_k_retrieve)
            .with_top_k_final(self.top_k_final);
        let candidates = self
            .retrieval
            .candidates(&retrieval_query, active_document)
            .await
            .map_err(|e| QueryFailure::at(QueryStage::Retrieved, e))?;
        stage = advance(stage, QueryStage::Retrieved);

        let passages = self
            .retrieval
            .rerank(&retrieval_query, candidates)
            .await
            .map_err(|e| QueryFailure::at(QueryStage::Reranked, e))?;
        stage = advance(stage, QueryStage::Reranked);
        tracing::debug!(passages = passages.len(), "context selected");

        let request = self.prompts.request(intent.clone(), &passages, query);
        let prompt = self.prompts.render(&request);
        stage = advance(stage, QueryStage::PromptBuilt);

        let text = match tokio::time::timeout(self.generation_timeout, self.generator.generate(&prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(QueryFailure::at(QueryStage::Answered, as_generation_error(e))),
            Err(_) => {
                return Err(QueryFailure::at(
                    QueryStage::Answered,
                    CyBotError::Generation(format!("timed out after {:?}", self.generation_timeout)),
                ));
            }
        };
        advance(stage, QueryStage::Answered);

        Ok(Answer {
            text,
            intent,
            passages_used: passages.len(),
        })
    }

    fn resolve_intent(&self, query: &str) -> IntentLabel {
        self.classifier.classify(query).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "intent classification failed, continuing without intent");
            IntentLabel::placeholder()
        })
    }
}

fn advance(from: QueryStage, to: QueryStage) -> QueryStage {
    tracing::debug!(%from, %to, "query stage");
    to
}

fn as_generation_error(error: CyBotError) -> CyBotError {
    match error {
        CyBotError::Generation(_) => error,
        other => CyBotError::Generation(other.to_string()),
    }
}
