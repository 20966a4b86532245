//! Critique Core
//!
//! Types and errors shared by the critique workspace.
//!
//! This crate provides:
//! - The labeled/unlabeled review records and prediction results
//! - The error taxonomy used by data loading, training and artifact I/O

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{LabeledExample, PredictionExample, PredictionResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{LabeledExample, PredictionExample, PredictionResult};
}
