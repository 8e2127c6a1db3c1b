use std::path::Path;

use anyhow::Result;
use cybot::{Config, CyBot};
use serde::Serialize;

use super::ingest_file;

#[derive(Serialize)]
struct AskOutput<'a> {
    question: &'a str,
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    intent: Option<String>,
    passages_used: usize,
    ok: bool,
}

pub async fn run(config: &Config, question: &str, document: Option<&Path>, json: bool) -> Result<()> {
    let bot = CyBot::from_config(config)?;

    let document_id = match document {
        Some(path) => Some(ingest_file(&bot, path).await?),
        None => None,
    };

    let result = bot.try_answer(question, document_id.as_ref()).await;
    if let Some(id) = &document_id {
        bot.evict_document(id);
    }

    let (output, exit_code) = match result {
        Ok(answer) => (
            AskOutput {
                question,
                answer: answer.text,
                intent: (!answer.intent.is_placeholder()).then(|| answer.intent.to_string()),
                passages_used: answer.passages_used,
                ok: true,
            },
            None,
        ),
        Err(failure) => (
            AskOutput {
                question,
                answer: failure.to_string(),
                intent: None,
                passages_used: 0,
                ok: false,
            },
            Some(failure.error.exit_code()),
        ),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.answer);
    }

    if let Some(code) = exit_code {
        std::process::exit(code);
    }
    Ok(())
}
