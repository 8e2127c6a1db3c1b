use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use cybot::Config;
use cybot::bot::build_embedder;
use cybot::index::save_index;
use cybot::services::{KnowledgeBaseBuilder, TextChunker, load_sections};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

#[derive(Serialize)]
struct BuildOutput<'a> {
    output: String,
    sections: usize,
    passages: usize,
    dimension: usize,
    model: &'a str,
}

pub async fn run(config: &Config, input: &Path, output: Option<&Path>, json: bool) -> Result<()> {
    let output = output.unwrap_or(config.knowledge_base.index_path.as_path());

    let sections = load_sections(input)?;
    let embedder = build_embedder(config)?;
    let chunker = TextChunker::new(config.chunking.size, config.chunking.overlap)?;
    let builder = KnowledgeBaseBuilder::new(Arc::clone(&embedder), chunker, config.embedding.batch_size);

    let passages = builder.passages(&sections)?;

    let progress = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(passages.len() as u64)
    };
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passages {msg}",
        )?
        .progress_chars("#>-"),
    );
    progress.set_message("embedding");

    let index = builder
        .build(passages, |done| progress.set_position(done as u64))
        .await?;
    progress.finish_with_message("done");

    save_index(output, &index, embedder.model_name())?;

    let summary = BuildOutput {
        output: output.display().to_string(),
        sections: sections.len(),
        passages: index.len(),
        dimension: index.dimension(),
        model: embedder.model_name(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Indexed {} passages from {} sections into {} ({}, {} dims)",
            summary.passages, summary.sections, summary.output, summary.model, summary.dimension
        );
    }
    Ok(())
}
