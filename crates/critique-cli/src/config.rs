//! Application configuration

use crate::cli::Cli;
use critique_classifiers::{DatasetFormat, TrainingConfig};
use critique_core::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_PATH: &str = "critique.yaml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Labeled training data
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Model artifact, read if present and written after training
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Training data layout
    #[serde(default)]
    pub dataset: DatasetFormat,

    /// Featurizer, trainer and split settings
    #[serde(default)]
    pub training: TrainingConfig,

    /// What to do when the artifact exists but cannot be read
    #[serde(default)]
    pub on_corrupt_model: CorruptModelPolicy,

    /// Train even if an artifact exists
    #[serde(default)]
    pub retrain: bool,

    /// Reviews classified at the end of the run; empty means the built-in samples
    #[serde(default)]
    pub reviews: Vec<String>,
}

/// Handling of an unreadable model artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptModelPolicy {
    /// Fail the run
    #[default]
    Abort,
    /// Train a new model and overwrite the artifact
    Retrain,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        // Apply CLI overrides
        if let Some(data) = &cli.data {
            config.data_path = data.clone();
        }

        if let Some(model) = &cli.model {
            config.model_path = model.clone();
        }

        if cli.retrain {
            config.retrain = true;
        }

        if !cli.texts.is_empty() {
            config.reviews = cli.texts.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| critique_core::Error::config(format!("invalid configuration: {e}")))
    }

    /// Load from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            critique_core::Error::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;
        self.dataset.delimiter_byte()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            model_path: default_model_path(),
            dataset: DatasetFormat::default(),
            training: TrainingConfig::default(),
            on_corrupt_model: CorruptModelPolicy::Abort,
            retrain: false,
            reviews: Vec::new(),
        }
    }
}

fn default_data_path() -> PathBuf {
    Path::new("data").join("train.txt")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model.zip")
}
