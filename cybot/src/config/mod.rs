use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CyBotError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub chunking: ChunkingConfig,
    pub reranker: RerankerConfig,
    pub intent: IntentConfig,
    pub knowledge_base: KnowledgeBaseConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    Ollama,
    FastEmbed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub endpoint: String,
    pub dimension: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            dimension: 768,
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    #[default]
    Groq,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: GenerationProvider,
    pub model: String,
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::Groq,
            model: "llama-3.1-8b-instant".to_string(),
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k_retrieve: usize,
    pub top_k_final: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k_retrieve: 5,
            top_k_final: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerankerProvider {
    /// BM25 over the candidates; needs no model files.
    Lexical,
    #[default]
    FastEmbed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerConfig {
    pub provider: RerankerProvider,
    pub model: String,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            provider: RerankerProvider::FastEmbed,
            model: "bge-reranker-base".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    pub model_path: PathBuf,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/intent_classifier.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    pub index_path: PathBuf,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("data/kb_index.json"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;
        let merged = Self::merge(global, project);
        let config = merged.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads exactly one file, skipping the global/project lookup.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::read_file(path)?
            .ok_or_else(|| CyBotError::Config(format!("{} does not exist", path.display())))?
            .with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.size == 0 {
            return Err(CyBotError::Config("chunking.size must be greater than zero".to_string()));
        }
        if self.chunking.overlap >= self.chunking.size {
            return Err(CyBotError::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.size ({})",
                self.chunking.overlap, self.chunking.size
            )));
        }
        if self.retrieval.top_k_retrieve == 0 || self.retrieval.top_k_final == 0 {
            return Err(CyBotError::Config(
                "retrieval.top_k_retrieve and retrieval.top_k_final must be greater than zero"
                    .to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(CyBotError::Config(
                "embedding.batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn load_global() -> Result<Self> {
        let config_dir = directories::ProjectDirs::from("", "", "cybot").map_or_else(
            || PathBuf::from("~/.config/cybot"),
            |d| d.config_dir().to_path_buf(),
        );

        Ok(Self::read_file(&config_dir.join("config.toml"))?.unwrap_or_default())
    }

    fn load_project() -> Result<Option<Self>> {
        Self::read_file(Path::new(".cybot/config.toml"))
    }

    fn read_file(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map(Some)
                .map_err(|e| CyBotError::Config(format!("{}: {e}", path.display())))
        } else {
            Ok(None)
        }
    }

    fn merge(global: Self, project: Option<Self>) -> Self {
        let Some(project) = project else {
            return global;
        };

        Self {
            generation: GenerationConfig {
                api_key: project.generation.api_key.or(global.generation.api_key),
                ..project.generation
            },
            ..project
        }
    }

    fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.generation.api_key = Some(key);
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            let host = normalize_host(&host);
            if self.embedding.provider == EmbeddingProvider::Ollama {
                self.embedding.endpoint.clone_from(&host);
            }
            if self.generation.provider == GenerationProvider::Ollama {
                self.generation.endpoint = host;
            }
        }
        if let Some(path) = lookup("CYBOT_KB_INDEX") {
            self.knowledge_base.index_path = PathBuf::from(path);
        }
    }
}

// OLLAMA_HOST is commonly given without a scheme ("127.0.0.1:11434").
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
