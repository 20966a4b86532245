//! Critique
//!
//! Load-or-train orchestration for the review sentiment model:
//! acquire a model (restore `model.zip` or train from `data/train.txt`),
//! report held-out metrics when freshly trained, then classify a batch of
//! sample reviews.

pub mod acquisition;
pub mod app;
pub mod cli;
pub mod config;
pub mod context;
pub mod demo;
pub mod report;

pub use acquisition::{acquire_model, Acquisition, EvaluationSet};
pub use app::{run, RunSummary};
pub use config::{AppConfig, CorruptModelPolicy};
pub use context::AppContext;
