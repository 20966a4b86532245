//! Critique
//!
//! Restores the review sentiment model from `model.zip` or trains one from
//! `data/train.txt`, then classifies a batch of sample reviews.

use anyhow::{Context, Result};
use clap::Parser;
use critique::cli::Cli;
use critique::{AppConfig, AppContext};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting critique");

    // Load configuration
    let config = AppConfig::load(&cli).context("failed to load configuration")?;
    info!("Configuration loaded");
    info!("Training data: {}", config.data_path.display());
    info!("Model artifact: {}", config.model_path.display());

    let ctx = AppContext::from_config(config).context("failed to build estimator")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    critique::run(&ctx, &mut out)?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("critique=debug,critique_classifiers=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("critique=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
