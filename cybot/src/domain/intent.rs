use serde::{Deserialize, Serialize};
use std::fmt;

const PLACEHOLDER: &str = "unknown";

/// Coarse query category. Advisory prompt context only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentLabel(String);

impl IntentLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Used when the classifier is unavailable or fails.
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER.to_string())
    }

    /// True when no classifier result was available for the query.
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
