use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "critique")]
#[command(
    author,
    version,
    about = "Train or load a review sentiment model and classify sample reviews",
    long_about = None
)]
pub struct Cli {
    /// Configuration file path (defaults to ./critique.yaml when present)
    #[arg(short, long, env = "CRITIQUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Labeled training data (tab-separated, with header)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Model artifact path
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Train a new model even if an artifact exists
    #[arg(long)]
    pub retrain: bool,

    /// Review to classify instead of the built-in samples (repeatable)
    #[arg(short, long = "text", value_name = "TEXT")]
    pub texts: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
