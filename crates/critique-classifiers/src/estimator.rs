//! Estimator trait: the trainable, persistable side of a model

use crate::classifier::Classifier;
use critique_core::{LabeledExample, Result};
use std::path::Path;

/// Something that can fit a [`Classifier`] from labeled examples and move it
/// to and from disk.
///
/// Application code is written against this trait so the real backend can be
/// swapped for a test double.
pub trait Estimator {
    /// The fitted model type
    type Model: Classifier;

    /// Estimator name, recorded in artifacts and logs
    fn name(&self) -> &str;

    /// Fit a new model
    fn fit(&self, examples: &[LabeledExample]) -> Result<Self::Model>;

    /// Persist a model to a single file, replacing any existing one
    fn save(&self, model: &Self::Model, path: &Path) -> Result<()>;

    /// Restore a model previously written by [`Estimator::save`]
    fn load(&self, path: &Path) -> Result<Self::Model>;
}
