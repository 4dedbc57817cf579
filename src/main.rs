// src/main.rs — suitegen entry point

use std::sync::Arc;

use clap::Parser;

use suitegen::cli::run::{resolve_config, run_loop};
use suitegen::cli::Cli;
use suitegen::infra::config::{api_key_from_env, load_dotenv};
use suitegen::infra::errors::SuiteGenError;
use suitegen::infra::logger;
use suitegen::infra::paths::Layout;
use suitegen::provider::google::GoogleProvider;
use suitegen::provider::ModelProvider;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{e:#}");
        if e
            .downcast_ref::<SuiteGenError>()
            .is_some_and(SuiteGenError::is_provider_error)
        {
            tracing::warn!("The model backend refused the request; check GEMINI_API_KEY and the model name");
        }
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Before config resolution so SUITEGEN_MODEL from .env applies too
    let dotenv = load_dotenv();
    let config = resolve_config(&cli)?;
    let layout = Layout::from_config(&config);

    // Logs go to stderr and the rotating file (respects RUST_LOG)
    logger::init_logging(&config.logging, &layout.log_file)?;
    if let Some(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let api_key = api_key_from_env()?;
    let provider: Arc<dyn ModelProvider> =
        Arc::new(GoogleProvider::new(api_key, config.model.base_url.clone()));

    run_loop(provider, &config, &layout).await?;
    Ok(())
}
