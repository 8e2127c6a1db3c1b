//! BM25 scoring over the candidate set itself. Needs no model files, so it is
//! the default reranker.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::adapters::intent::tokenize;
use crate::error::Result;
use crate::ports::Reranker;

const K1: f32 = 1.2;
const B: f32 = 0.75;

#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalReranker;

impl LexicalReranker {
    #[allow(clippy::cast_precision_loss)] // candidate counts and lengths are small
    pub fn bm25(query: &str, passages: &[&str]) -> Vec<f32> {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        let documents: Vec<Vec<String>> = passages.iter().map(|p| tokenize(p)).collect();
        if documents.is_empty() {
            return Vec::new();
        }

        let total = documents.len() as f32;
        let avg_len = (documents.iter().map(Vec::len).sum::<usize>() as f32 / total).max(1.0);

        let doc_freq: HashMap<&str, usize> = query_terms
            .iter()
            .map(|term| {
                let df = documents.iter().filter(|doc| doc.contains(term)).count();
                (term.as_str(), df)
            })
            .collect();

        documents
            .iter()
            .map(|doc| {
                let len = doc.len() as f32;
                query_terms
                    .iter()
                    .map(|term| {
                        let tf = doc.iter().filter(|token| *token == term).count() as f32;
                        if tf == 0.0 {
                            return 0.0;
                        }
                        let df = doc_freq[term.as_str()] as f32;
                        let idf = ((total - df + 0.5) / (df + 0.5)).ln_1p();
                        idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * len / avg_len))
                    })
                    .sum()
            })
            .collect()
    }
}

#[async_trait]
impl Reranker for LexicalReranker {
    async fn score(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>> {
        Ok(Self::bm25(query, passages))
    }

    fn name(&self) -> &str {
        "lexical-bm25"
    }
}
