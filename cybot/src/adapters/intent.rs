//! Linear intent model exported offline as JSON.
//!
//! The model is a TF-IDF vectorizer followed by a linear classifier:
//! lowercased word tokens of two or more alphanumeric chars, n-grams up to
//! `ngram_max`, raw term counts scaled by `idf` and L2-normalised, then the
//! label with the highest `coef · x + intercept` wins. Binary models may ship
//! a single coefficient row, in which case a positive decision selects
//! `labels[1]`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::IntentLabel;
use crate::error::{CyBotError, Result};
use crate::ports::IntentClassifier;

#[derive(Debug, Deserialize)]
struct IntentModelFile {
    labels: Vec<String>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
    #[serde(default = "default_ngram_max")]
    ngram_max: usize,
}

const fn default_ngram_max() -> usize {
    1
}

#[derive(Debug)]
pub struct LinearIntentClassifier {
    model: IntentModelFile,
}

impl LinearIntentClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CyBotError::IntentClassification(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: IntentModelFile = serde_json::from_str(json)
            .map_err(|e| CyBotError::IntentClassification(format!("invalid intent model: {e}")))?;
        Self::validate(&model)?;
        Ok(Self { model })
    }

    pub fn labels(&self) -> &[String] {
        &self.model.labels
    }

    fn validate(model: &IntentModelFile) -> Result<()> {
        let features = model.idf.len();
        let rows = model.coef.len();
        let binary_rows = model.labels.len() == 2 && rows == 1;

        if model.labels.len() < 2 {
            return Err(invalid("at least two labels are required"));
        }
        if rows != model.labels.len() && !binary_rows {
            return Err(invalid("coef must have one row per label"));
        }
        if model.intercept.len() != rows {
            return Err(invalid("intercept must have one entry per coef row"));
        }
        if model.coef.iter().any(|row| row.len() != features) {
            return Err(invalid("coef rows must match the idf length"));
        }
        if model.vocabulary.values().any(|&column| column >= features) {
            return Err(invalid("vocabulary column out of range"));
        }
        if model.ngram_max == 0 {
            return Err(invalid("ngram_max must be at least 1"));
        }
        Ok(())
    }

    fn features(&self, query: &str) -> HashMap<usize, f32> {
        let tokens = tokenize(query);
        let mut counts: HashMap<usize, f32> = HashMap::new();

        for n in 1..=self.model.ngram_max {
            for gram in tokens.windows(n) {
                if let Some(&column) = self.model.vocabulary.get(&gram.join(" ")) {
                    *counts.entry(column).or_default() += 1.0;
                }
            }
        }

        for (column, value) in &mut counts {
            *value *= self.model.idf[*column];
        }

        let norm = counts.values().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        counts
    }

    fn decision(&self, row: usize, features: &HashMap<usize, f32>) -> f32 {
        let weights = &self.model.coef[row];
        features
            .iter()
            .map(|(&column, &value)| weights[column] * value)
            .sum::<f32>()
            + self.model.intercept[row]
    }
}

impl IntentClassifier for LinearIntentClassifier {
    fn classify(&self, query: &str) -> Result<IntentLabel> {
        let features = self.features(query);

        let label = if self.model.coef.len() == 1 {
            if self.decision(0, &features) > 0.0 {
                &self.model.labels[1]
            } else {
                &self.model.labels[0]
            }
        } else {
            let best = (0..self.model.coef.len())
                .map(|row| (row, self.decision(row, &features)))
                .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
                .map(|(row, _)| row)
                .ok_or_else(|| CyBotError::IntentClassification("model has no labels".to_string()))?;
            &self.model.labels[best]
        };

        Ok(IntentLabel::new(label.clone()))
    }
}

/// Stands in when no model could be loaded; every call fails so the
/// orchestrator falls back to the placeholder label.
#[derive(Debug)]
pub struct UnavailableIntentClassifier {
    reason: String,
}

impl UnavailableIntentClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl IntentClassifier for UnavailableIntentClassifier {
    fn classify(&self, _query: &str) -> Result<IntentLabel> {
        Err(CyBotError::IntentClassification(format!(
            "classifier unavailable: {}",
            self.reason
        )))
    }
}

fn invalid(reason: &str) -> CyBotError {
    CyBotError::IntentClassification(format!("invalid intent model: {reason}"))
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MODEL: &str = r#"{
        "labels": ["greeting", "legal_query", "out_of_scope"],
        "vocabulary": {
            "hello": 0, "hi": 1, "section": 2, "theft": 3,
            "identity": 4, "capital": 5, "france": 6, "identity theft": 7
        },
        "idf": [1.0, 1.0, 1.2, 1.5, 1.5, 2.0, 2.0, 2.5],
        "coef": [
            [3.0, 3.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0],
            [-1.0, -1.0, 2.0, 2.0, 2.0, -2.0, -2.0, 2.0],
            [-1.0, -1.0, -1.0, -1.0, -1.0, 3.0, 3.0, -1.0]
        ],
        "intercept": [0.0, 0.1, 0.0],
        "ngram_max": 2
    }"#;

    #[test]
    fn test_tokenize_matches_word_pattern() {
        assert_eq!(
            tokenize("What is Section 66C? A b-c"),
            vec!["what", "is", "section", "66c"]
        );
    }

    #[test]
    fn test_classifies_queries() {
        let classifier = LinearIntentClassifier::from_json(MODEL).unwrap();
        assert_eq!(classifier.classify("Hello there").unwrap().as_str(), "greeting");
        assert_eq!(
            classifier.classify("What does Section 66C say about identity theft?").unwrap().as_str(),
            "legal_query"
        );
        assert_eq!(
            classifier.classify("What is the capital of France?").unwrap().as_str(),
            "out_of_scope"
        );
    }

    #[test]
    fn test_unknown_words_fall_back_to_intercept() {
        let classifier = LinearIntentClassifier::from_json(MODEL).unwrap();
        assert_eq!(classifier.classify("zzz qqq").unwrap().as_str(), "legal_query");
    }

    #[test]
    fn test_binary_model_uses_sign() {
        let classifier = LinearIntentClassifier::from_json(
            r#"{
                "labels": ["chitchat", "legal"],
                "vocabulary": {"law": 0, "hello": 1},
                "idf": [1.0, 1.0],
                "coef": [[2.0, -2.0]],
                "intercept": [0.0]
            }"#,
        )
        .unwrap();
        assert_eq!(classifier.classify("cyber law").unwrap().as_str(), "legal");
        assert_eq!(classifier.classify("hello").unwrap().as_str(), "chitchat");
    }

    #[test]
    fn test_rejects_inconsistent_models() {
        let bad = r#"{
            "labels": ["a", "b", "c"],
            "vocabulary": {"x": 0},
            "idf": [1.0],
            "coef": [[1.0], [1.0]],
            "intercept": [0.0, 0.0]
        }"#;
        assert!(LinearIntentClassifier::from_json(bad).is_err());
        assert!(LinearIntentClassifier::from_json("not json").is_err());
    }

    #[test]
    fn test_missing_file_is_classification_error() {
        let err = LinearIntentClassifier::load(Path::new("/nonexistent/intent.json")).unwrap_err();
        assert!(matches!(err, CyBotError::IntentClassification(_)));
    }

    #[test]
    fn test_unavailable_classifier_always_fails() {
        let classifier = UnavailableIntentClassifier::new("model file missing");
        assert!(classifier.classify("hi").is_err());
    }
}
