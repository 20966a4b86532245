//! Model acquisition: restore the persisted model or train a new one
//!
//! The outcome is an explicit [`Acquisition`] so callers know whether fresh
//! metrics exist without re-checking the filesystem.

use crate::config::CorruptModelPolicy;
use crate::context::AppContext;
use critique_classifiers::{evaluate, load_labeled_examples, train_test_split, BinaryMetrics, Estimator};
use critique_core::Result;
use tracing::{info, warn};

/// How the model for this run was obtained
pub enum Acquisition<M> {
    /// Restored from the artifact; training data was not touched
    Loaded(M),

    /// Trained, evaluated, and persisted during this run
    TrainedFresh(M, BinaryMetrics, EvaluationSet),
}

/// Rows the reported metrics were computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationSet {
    /// Rows withheld from training
    HeldOut,
    /// The training rows themselves; nothing was held out
    Training,
}

impl<M> Acquisition<M> {
    pub fn model(&self) -> &M {
        match self {
            Self::Loaded(model) | Self::TrainedFresh(model, ..) => model,
        }
    }

    pub fn into_model(self) -> M {
        match self {
            Self::Loaded(model) | Self::TrainedFresh(model, ..) => model,
        }
    }

    /// Evaluation metrics, present only for a freshly trained model
    pub fn metrics(&self) -> Option<&BinaryMetrics> {
        match self {
            Self::Loaded(_) => None,
            Self::TrainedFresh(_, metrics, _) => Some(metrics),
        }
    }

    /// Which rows the metrics cover, present only for a freshly trained model
    pub fn evaluation_set(&self) -> Option<EvaluationSet> {
        match self {
            Self::Loaded(_) => None,
            Self::TrainedFresh(_, _, set) => Some(*set),
        }
    }

    pub fn was_trained(&self) -> bool {
        matches!(self, Self::TrainedFresh(..))
    }
}

/// Obtain the model for this run
///
/// Loads the artifact at the configured model path when it exists (unless a
/// retrain was requested); otherwise trains from the configured data file,
/// evaluates on the held-out split and writes the artifact.
pub fn acquire_model<E: Estimator>(ctx: &AppContext<E>) -> Result<Acquisition<E::Model>> {
    let model_path = ctx.model_path();

    if ctx.config.retrain {
        info!("Retraining requested, ignoring any existing model");
    } else if model_path.exists() {
        info!("Loading model from {}", model_path.display());

        match ctx.estimator.load(model_path) {
            Ok(model) => return Ok(Acquisition::Loaded(model)),
            Err(e)
                if e.is_corrupt_artifact()
                    && ctx.config.on_corrupt_model == CorruptModelPolicy::Retrain =>
            {
                warn!("{}; training a replacement", e);
            }
            Err(e) => return Err(e),
        }
    } else {
        info!("No model at {}, training a new one", model_path.display());
    }

    train_fresh(ctx)
}

fn train_fresh<E: Estimator>(ctx: &AppContext<E>) -> Result<Acquisition<E::Model>> {
    let examples = load_labeled_examples(ctx.data_path(), &ctx.config.dataset)?;
    let split = train_test_split(examples, &ctx.config.training.split)?;

    info!(
        "Creating and training the model on {} examples",
        split.train.len()
    );
    let model = ctx.estimator.fit(&split.train)?;
    info!("Training complete");

    let (eval_rows, eval_set) = if split.test.is_empty() {
        // nothing held out, so the training rows are the whole dataset
        warn!("Held-out split is empty, evaluating on the full dataset");
        (split.train.as_slice(), EvaluationSet::Training)
    } else {
        (split.test.as_slice(), EvaluationSet::HeldOut)
    };

    info!("Evaluating model accuracy on {} examples", eval_rows.len());
    let metrics = evaluate(&model, eval_rows)?;
    info!("Evaluation complete: accuracy {:.2}%", metrics.accuracy * 100.0);

    ctx.estimator.save(&model, ctx.model_path())?;

    Ok(Acquisition::TrainedFresh(model, metrics, eval_set))
}
