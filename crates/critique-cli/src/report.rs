//! Console reporting
//!
//! Human-readable output goes through any `io::Write` so it stays separate
//! from tracing logs and can be captured in tests.

use crate::acquisition::EvaluationSet;
use critique_classifiers::BinaryMetrics;
use critique_core::PredictionResult;
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;

/// Print evaluation metrics, flagging those not measured on held-out rows
pub fn print_metrics(
    out: &mut impl Write,
    metrics: &BinaryMetrics,
    evaluated_on: EvaluationSet,
) -> io::Result<()> {
    writeln!(out, "Model quality metrics")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    if evaluated_on == EvaluationSet::Training {
        writeln!(
            out,
            "Note: no rows were held out; metrics are over the training data"
        )?;
    }
    writeln!(out, "{metrics}")?;

    let confusion = &metrics.confusion;
    writeln!(
        out,
        "Confusion:          TP={} FP={} TN={} FN={}",
        confusion.true_positive,
        confusion.false_positive,
        confusion.true_negative,
        confusion.false_negative
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// Print one block per prediction
pub fn print_predictions(out: &mut impl Write, results: &[PredictionResult]) -> io::Result<()> {
    writeln!(out, "Prediction test")?;

    for result in results {
        let verdict = if result.predicted_label {
            "Positive review"
        } else {
            "Negative review"
        };
        writeln!(out, "Review: {}", result.text)?;
        writeln!(out, "Prediction: {verdict}")?;
        writeln!(out, "Probability: {:.2}%", result.probability * 100.0)?;
        writeln!(out, "Confidence: {:.2}%", result.confidence() * 100.0)?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use critique_classifiers::Prediction;

    #[test]
    fn test_print_predictions() {
        let results = vec![
            PredictionResult {
                text: "superbe".to_string(),
                predicted_label: true,
                probability: 0.9731,
                score: 3.6,
            },
            PredictionResult {
                text: "nul".to_string(),
                predicted_label: false,
                probability: 0.0412,
                score: -3.1,
            },
        ];

        let mut out = Vec::new();
        print_predictions(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Prediction test\n"));
        assert!(text.contains(
            "Review: superbe\nPrediction: Positive review\nProbability: 97.31%\nConfidence: 97.31%\n"
        ));
        assert!(text.contains(
            "Review: nul\nPrediction: Negative review\nProbability: 4.12%\nConfidence: 95.88%\n"
        ));
        assert_eq!(text.matches(&"-".repeat(80)).count(), 2);
    }

    #[test]
    fn test_print_metrics() {
        let predictions = [
            Prediction::from_score(2.0, 0.5),
            Prediction::from_score(-2.0, 0.5),
            Prediction::from_score(1.0, 0.5),
            Prediction::from_score(-1.0, 0.5),
        ];
        let metrics =
            BinaryMetrics::from_predictions(&predictions, &[true, false, false, false]).unwrap();

        let mut out = Vec::new();
        print_metrics(&mut out, &metrics, EvaluationSet::HeldOut).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Accuracy:           75.00%"));
        assert!(text.contains("TP=1 FP=1 TN=2 FN=0"));
        assert!(!text.contains("training data"));

        let mut out = Vec::new();
        print_metrics(&mut out, &metrics, EvaluationSet::Training).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("metrics are over the training data"));
        assert!(text.contains("Accuracy:           75.00%"));
    }
}
