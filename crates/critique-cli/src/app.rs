//! One end-to-end run: acquire the model, report, classify the sample reviews

use crate::acquisition::{acquire_model, EvaluationSet};
use crate::context::AppContext;
use crate::demo::{demo_examples, predict};
use crate::report::{print_metrics, print_predictions};
use critique_classifiers::{BinaryMetrics, Estimator};
use critique_core::{PredictionResult, Result};
use std::io::Write;
use tracing::info;

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Evaluation metrics; `None` when the model was loaded from disk
    pub metrics: Option<BinaryMetrics>,

    /// Rows the metrics were computed over
    pub evaluation_set: Option<EvaluationSet>,

    /// One result per sample review, in input order
    pub results: Vec<PredictionResult>,
}

impl RunSummary {
    pub fn was_trained(&self) -> bool {
        self.metrics.is_some()
    }
}

/// Acquire the model, print metrics if it was just trained, then classify and
/// print the sample reviews
pub fn run<E: Estimator, W: Write>(ctx: &AppContext<E>, out: &mut W) -> Result<RunSummary> {
    let acquisition = acquire_model(ctx)?;

    let metrics = acquisition.metrics().cloned();
    let evaluation_set = acquisition.evaluation_set();
    if let (Some(metrics), Some(set)) = (&metrics, evaluation_set) {
        print_metrics(out, metrics, set)?;
    }

    let model = acquisition.into_model();
    let examples = demo_examples(&ctx.config);
    let results = predict(&model, &examples)?;
    print_predictions(out, &results)?;
    out.flush()?;

    info!(predictions = results.len(), "Run complete");

    Ok(RunSummary {
        metrics,
        evaluation_set,
        results,
    })
}
