use std::process::ExitCode;

use anyhow::{Context, Result};
use ceprace_engine::Dispatcher;
use ceprace_types::LookupKey;
use ceprace_util::{Settings, normalize_cep};
use clap::Parser;
use tracing::debug;

mod cli;
mod render;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cep = normalize_cep(&cli.cep).with_context(|| format!("invalid CEP '{}'", cli.cep))?;
    let key = LookupKey::new(&cep)?;

    let settings = Settings::load(cli.config.as_deref(), cli.overrides()).context("load configuration")?;
    let dispatcher = Dispatcher::from_settings(&settings).context("configure providers")?;
    debug!(providers = ?dispatcher.provider_ids(), timeout_ms = settings.timeout_ms, "dispatching");

    let outcome = dispatcher.resolve(&key).await?;
    if cli.json {
        println!("{}", render::render_json(&outcome)?);
    } else {
        println!("{}", render::render_text(&outcome, settings.timeout()));
    }

    Ok(if outcome.is_resolved() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
