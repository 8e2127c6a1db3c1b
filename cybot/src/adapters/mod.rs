pub mod extract;
pub mod groq;
pub mod intent;
pub mod lexical;
#[cfg(feature = "fastembed")]
pub mod local;
pub mod ollama;

pub use extract::{AutoExtractor, PdfTextExtractor, PlainTextExtractor};
pub use groq::GroqGenerator;
pub use intent::{LinearIntentClassifier, UnavailableIntentClassifier};
pub use lexical::LexicalReranker;
#[cfg(feature = "fastembed")]
pub use local::{CrossEncoderReranker, FastEmbedEmbedder};
pub use ollama::{OllamaEmbedder, OllamaGenerator};
