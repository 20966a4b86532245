//! Critique Classifiers
//!
//! The machine-learning side of critique: turning review text into features,
//! fitting a binary sentiment model, scoring it, and persisting it.
//!
//! The orchestration layer only sees two seams:
//! - [`Estimator`]: `fit`, `save`, `load`
//! - [`Classifier`]: batch prediction over a fitted model
//!
//! [`LogisticRegression`] is the Candle-backed implementation of both.

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod estimator;
pub mod evaluation;
pub mod featurizer;
pub mod logistic;

pub use artifact::{ArtifactManifest, ARTIFACT_FORMAT_VERSION};
pub use classifier::{Classifier, Prediction};
pub use config::{DatasetFormat, DeviceSpec, FeaturizerConfig, SplitConfig, TrainerConfig, TrainingConfig};
pub use dataset::{load_labeled_examples, read_labeled_examples, train_test_split, TrainTestSplit};
pub use estimator::Estimator;
pub use evaluation::{evaluate, BinaryMetrics, ConfusionMatrix};
pub use featurizer::{FeatureVector, TextFeaturizer};
pub use logistic::{LogisticModel, LogisticRegression};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, Prediction};
    pub use crate::config::TrainingConfig;
    pub use crate::estimator::Estimator;
    pub use crate::evaluation::{evaluate, BinaryMetrics};
    pub use crate::logistic::{LogisticModel, LogisticRegression};
}
