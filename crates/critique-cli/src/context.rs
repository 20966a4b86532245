//! Application context shared by every step of a run

use crate::config::AppConfig;
use critique_classifiers::{Estimator, LogisticRegression};
use critique_core::Result;
use std::path::Path;

/// Configuration plus the estimator that trains, saves and loads models.
///
/// Built once at startup and passed by reference to each step; nothing in the
/// run holds state outside of it.
pub struct AppContext<E: Estimator> {
    pub config: AppConfig,
    pub estimator: E,
}

impl<E: Estimator> AppContext<E> {
    pub fn new(config: AppConfig, estimator: E) -> Self {
        Self { config, estimator }
    }

    pub fn data_path(&self) -> &Path {
        &self.config.data_path
    }

    pub fn model_path(&self) -> &Path {
        &self.config.model_path
    }
}

impl AppContext<LogisticRegression> {
    /// Context backed by the Candle logistic regression estimator
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let estimator = LogisticRegression::new(config.training.clone())?;
        Ok(Self::new(config, estimator))
    }
}
