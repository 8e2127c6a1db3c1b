use std::io::Write;
use std::path::Path;

use anyhow::Result;
use console::style;
use cybot::{Config, CyBot, DocumentId};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::ingest_file;

pub async fn run(config: &Config, document: Option<&Path>) -> Result<()> {
    let bot = CyBot::from_config(config)?;
    let mut active: Option<DocumentId> = None;

    if let Some(path) = document {
        active = Some(ingest_file(&bot, path).await?);
        println!("{} {}", style("Loaded").green(), path.display());
    }

    println!(
        "{} Ask about Kerala cyber laws. {} to load a document, {} to drop it, {} to leave.",
        style("Cy-Bot is ready.").bold(),
        style("/upload <file>").cyan(),
        style("/remove").cyan(),
        style("exit").cyan()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n{} ", style("You:").bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => {}
            "exit" | "quit" => break,
            "/remove" => match active.take() {
                Some(id) => {
                    bot.evict_document(&id);
                    println!("{}", style("Document removed.").dim());
                }
                None => println!("{}", style("No document is loaded.").dim()),
            },
            _ if line.starts_with("/upload") => {
                let path = line.trim_start_matches("/upload").trim();
                if path.is_empty() {
                    println!("{}", style("Usage: /upload <file>").yellow());
                    continue;
                }
                match ingest_file(&bot, Path::new(path)).await {
                    Ok(id) => {
                        if let Some(previous) = active.replace(id) {
                            bot.evict_document(&previous);
                        }
                        println!("{} {path}", style("Loaded").green());
                    }
                    Err(e) => println!("{} {e:#}", style("Upload failed:").red()),
                }
            }
            question => {
                let answer = bot.answer(question, active.as_ref()).await;
                println!("{} {answer}", style("Cy-Bot:").cyan().bold());
            }
        }
    }

    if let Some(id) = active {
        bot.evict_document(&id);
    }
    Ok(())
}
