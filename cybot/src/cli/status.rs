use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use cybot::Config;
use cybot::index::load_index;
use serde::Serialize;

#[derive(Serialize)]
struct StatusOutput {
    embedding: String,
    generation: String,
    api_key_set: bool,
    reranker: String,
    intent_model: String,
    intent_model_present: bool,
    index_path: String,
    index_passages: Option<usize>,
    index_model: Option<String>,
    index_built_at: Option<DateTime<Utc>>,
    index_error: Option<String>,
}

pub fn run(config: &Config, json: bool) -> Result<()> {
    let (index_passages, index_model, index_built_at, index_error) =
        match load_index(&config.knowledge_base.index_path) {
            Ok(loaded) => (Some(loaded.index.len()), Some(loaded.model), Some(loaded.built_at), None),
            Err(e) => (None, None, None, Some(e.to_string())),
        };

    let status = StatusOutput {
        embedding: format!(
            "{} {} ({} dims)",
            name(config.embedding.provider),
            config.embedding.model,
            config.embedding.dimension
        ),
        generation: format!("{} {}", name(config.generation.provider), config.generation.model),
        api_key_set: config.generation.api_key.is_some(),
        reranker: name(config.reranker.provider),
        intent_model: config.intent.model_path.display().to_string(),
        intent_model_present: config.intent.model_path.exists(),
        index_path: config.knowledge_base.index_path.display().to_string(),
        index_passages,
        index_model,
        index_built_at,
        index_error,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", style("Cy-Bot status").bold());
    println!("  Embedding:    {}", status.embedding);
    println!("  Generation:   {}", status.generation);
    println!("  API key:      {}", if status.api_key_set { "set" } else { "not set" });
    println!("  Reranker:     {}", status.reranker);
    println!(
        "  Intent model: {} ({})",
        status.intent_model,
        if status.intent_model_present { "present" } else { "missing" }
    );
    match (status.index_passages, &status.index_error) {
        (Some(passages), _) => {
            println!(
                "  Index:        {} ({passages} passages, {})",
                status.index_path,
                status.index_model.as_deref().unwrap_or("unknown model")
            );
            if let Some(built_at) = status.index_built_at {
                println!("  Built:        {}", built_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
        (None, Some(error)) => println!(
            "  Index:        {} {}",
            status.index_path,
            style(format!("({error})")).red()
        ),
        (None, None) => println!("  Index:        {}", status.index_path),
    }
    Ok(())
}

// Matches the lowercase names used in config.toml.
fn name(provider: impl std::fmt::Debug) -> String {
    format!("{provider:?}").to_lowercase()
}
