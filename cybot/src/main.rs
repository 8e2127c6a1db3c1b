use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cybot=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli).await {
        let code = e
            .downcast_ref::<cybot::CyBotError>()
            .map_or(1, cybot::CyBotError::exit_code);
        eprintln!("{} {e:#}", console::style("error:").red().bold());
        std::process::exit(code);
    }
    Ok(())
}
