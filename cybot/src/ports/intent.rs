use crate::domain::IntentLabel;
use crate::error::Result;

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, query: &str) -> Result<IntentLabel>;
}
