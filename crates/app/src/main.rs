use std::process::ExitCode;

use clap::Parser;
use engine::{Engine, MemoryStore};
use store_client::HttpStore;

use crate::{cli::Cli, error::Result, output::Output, settings::Settings};

mod cli;
mod commands;
mod error;
mod output;
mod settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match settings::load(&cli.connection) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(settings.log_filter())
        .init();

    match run(cli, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("command failed: {err:?}");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli, settings: &Settings) -> Result<()> {
    let today = chrono::Local::now().date_naive();

    let output: Output = match &cli.fixtures {
        Some(path) => {
            tracing::info!("using fixtures from {}", path.display());
            let raw = std::fs::read_to_string(path)?;
            let store = MemoryStore::from_fixtures(serde_json::from_str(&raw)?)?;
            let engine = Engine::builder().store(store).build()?;
            commands::execute(&engine, cli.command, today).await?
        }
        None => {
            let store = HttpStore::new(settings.store_config())?;
            tracing::debug!("record store at {}", store.base_url());
            let engine = Engine::builder().store(store).build()?;
            commands::execute(&engine, cli.command, today).await?
        }
    };

    output.emit(&mut std::io::stdout().lock())
}
