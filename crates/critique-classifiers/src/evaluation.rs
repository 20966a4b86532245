//! Binary classification metrics

use crate::classifier::{Classifier, Prediction};
use critique_core::{LabeledExample, Result};
use serde::Serialize;
use std::fmt;
use tracing::info;

const LOG_LOSS_EPSILON: f64 = 1e-15;

/// Counts of predicted vs. actual labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn correct(&self) -> usize {
        self.true_positive + self.true_negative
    }

    fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positive += 1,
            (true, false) => self.false_positive += 1,
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_negative += 1,
        }
    }
}

/// Quality of a binary classifier over a labeled set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryMetrics {
    /// Fraction of correct predictions (0.0-1.0)
    pub accuracy: f64,

    /// Of the rows predicted positive, fraction actually positive
    pub positive_precision: f64,

    /// Of the actually positive rows, fraction predicted positive
    pub positive_recall: f64,

    pub negative_precision: f64,

    pub negative_recall: f64,

    /// Harmonic mean of positive precision and recall
    pub f1_score: f64,

    /// Area under the ROC curve; `None` when only one class is present
    pub auc: Option<f64>,

    /// Mean cross-entropy of the positive-class probabilities
    pub log_loss: f64,

    pub confusion: ConfusionMatrix,
}

impl BinaryMetrics {
    /// Compute metrics from predictions and the matching ground truth
    pub fn from_predictions(predictions: &[Prediction], labels: &[bool]) -> Result<Self> {
        if predictions.len() != labels.len() {
            return Err(critique_core::Error::evaluation(format!(
                "{} predictions for {} labels",
                predictions.len(),
                labels.len()
            )));
        }
        if labels.is_empty() {
            return Err(critique_core::Error::evaluation(
                "cannot evaluate over zero examples",
            ));
        }

        let mut confusion = ConfusionMatrix::default();
        let mut log_loss = 0.0;

        for (prediction, &actual) in predictions.iter().zip(labels) {
            confusion.record(prediction.label, actual);

            let p = (prediction.probability as f64).clamp(LOG_LOSS_EPSILON, 1.0 - LOG_LOSS_EPSILON);
            log_loss -= if actual { p.ln() } else { (1.0 - p).ln() };
        }

        let c = &confusion;
        let positive_precision = ratio(c.true_positive, c.true_positive + c.false_positive);
        let positive_recall = ratio(c.true_positive, c.true_positive + c.false_negative);
        let negative_precision = ratio(c.true_negative, c.true_negative + c.false_negative);
        let negative_recall = ratio(c.true_negative, c.true_negative + c.false_positive);
        let f1_score = if positive_precision + positive_recall > 0.0 {
            2.0 * positive_precision * positive_recall / (positive_precision + positive_recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy: ratio(c.correct(), c.total()),
            positive_precision,
            positive_recall,
            negative_precision,
            negative_recall,
            f1_score,
            auc: roc_auc(predictions, labels),
            log_loss: log_loss / labels.len() as f64,
            confusion,
        })
    }
}

impl fmt::Display for BinaryMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:           {:.2}%", self.accuracy * 100.0)?;
        match self.auc {
            Some(auc) => writeln!(f, "AUC:                {:.4}", auc)?,
            None => writeln!(f, "AUC:                n/a")?,
        }
        writeln!(f, "F1 score:           {:.4}", self.f1_score)?;
        writeln!(f, "Positive precision: {:.4}", self.positive_precision)?;
        writeln!(f, "Positive recall:    {:.4}", self.positive_recall)?;
        writeln!(f, "Negative precision: {:.4}", self.negative_precision)?;
        writeln!(f, "Negative recall:    {:.4}", self.negative_recall)?;
        write!(f, "Log-loss:           {:.4}", self.log_loss)
    }
}

/// Run `model` over `examples` and score it against their labels
pub fn evaluate<C: Classifier + ?Sized>(model: &C, examples: &[LabeledExample]) -> Result<BinaryMetrics> {
    let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
    let labels: Vec<bool> = examples.iter().map(|e| e.label).collect();

    let predictions = model.predict(&texts)?;
    let metrics = BinaryMetrics::from_predictions(&predictions, &labels)?;

    info!(
        classifier = model.name(),
        examples = examples.len(),
        accuracy = metrics.accuracy,
        "Evaluation complete"
    );

    Ok(metrics)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Mann-Whitney estimate of ROC AUC with average ranks for ties
///
/// Ranks on the raw score; the sigmoid saturates to 1.0 for large logits and
/// would turn confident predictions into ties.
fn roc_auc(predictions: &[Prediction], labels: &[bool]) -> Option<f64> {
    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..predictions.len()).collect();
    order.sort_by(|&a, &b| predictions[a].score.total_cmp(&predictions[b].score));

    let mut positive_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len()
            && predictions[order[j + 1]].score == predictions[order[i]].score
        {
            j += 1;
        }
        // ranks are 1-based; tied block i..=j shares the mean rank
        let rank = (i + j) as f64 / 2.0 + 1.0;
        positive_rank_sum += rank * order[i..=j].iter().filter(|&&k| labels[k]).count() as f64;
        i = j + 1;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}
