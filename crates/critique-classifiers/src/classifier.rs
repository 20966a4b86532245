//! Classifier trait and common types

use critique_core::{PredictionExample, PredictionResult, Result};

/// Default decision threshold on the positive-class probability
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// A fitted binary sentiment model
pub trait Classifier {
    /// Score a batch of texts; output order matches input order
    fn predict(&self, texts: &[&str]) -> Result<Vec<Prediction>>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Probability at or above which a text is labeled positive
    fn threshold(&self) -> f32 {
        DEFAULT_THRESHOLD
    }

    /// Classify a single text
    fn classify(&self, text: &str) -> Result<Prediction> {
        self.predict(&[text])?.pop().ok_or_else(|| {
            critique_core::Error::backend(format!("{} returned no prediction", self.name()))
        })
    }

    /// Run the model over prediction examples, pairing each result with its text
    fn predict_examples(&self, examples: &[PredictionExample]) -> Result<Vec<PredictionResult>> {
        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let predictions = self.predict(&texts)?;

        if predictions.len() != examples.len() {
            return Err(critique_core::Error::backend(format!(
                "{} returned {} predictions for {} inputs",
                self.name(),
                predictions.len(),
                examples.len()
            )));
        }

        Ok(examples
            .iter()
            .zip(predictions)
            .map(|(example, prediction)| prediction.into_result(example.text.clone()))
            .collect())
    }
}

/// Result of scoring one text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// `true` for positive
    pub label: bool,

    /// Probability of the positive class (0.0-1.0)
    pub probability: f32,

    /// Raw decision value (logit)
    pub score: f32,
}

impl Prediction {
    /// Build a prediction from a logit; the label is derived from the probability
    /// so the two can never disagree
    pub fn from_score(score: f32, threshold: f32) -> Self {
        let probability = sigmoid(score);
        Self {
            label: probability >= threshold,
            probability,
            score,
        }
    }

    /// Attach the input text
    pub fn into_result(self, text: String) -> PredictionResult {
        PredictionResult {
            text,
            predicted_label: self.label,
            probability: self.probability,
            score: self.score,
        }
    }
}

/// Logistic function, stable for large magnitudes
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier;

    impl Classifier for FixedClassifier {
        fn predict(&self, texts: &[&str]) -> Result<Vec<Prediction>> {
            Ok(texts
                .iter()
                .map(|t| Prediction::from_score(t.len() as f32 - 5.0, DEFAULT_THRESHOLD))
                .collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(100.0) <= 1.0);
        assert!(sigmoid(-100.0) >= 0.0);
        assert!(sigmoid(-100.0).is_finite());
    }

    #[test]
    fn test_label_matches_probability() {
        let p = Prediction::from_score(0.0, 0.5);
        assert!(p.label);
        assert_eq!(p.probability, 0.5);

        let p = Prediction::from_score(-0.01, 0.5);
        assert!(!p.label);
        assert!(p.probability < 0.5);
    }

    #[test]
    fn test_predict_examples_keeps_text() {
        let examples = vec![
            PredictionExample::new("short"),
            PredictionExample::new("a much longer review"),
            PredictionExample::new("ok"),
        ];

        let results = FixedClassifier.predict_examples(&examples).unwrap();

        assert_eq!(results.len(), 3);
        for (example, result) in examples.iter().zip(&results) {
            assert_eq!(example.text, result.text);
        }
        assert!(results[1].predicted_label);
        assert!(!results[2].predicted_label);
    }

    #[test]
    fn test_classify_single() {
        let p = FixedClassifier.classify("twelve chars").unwrap();
        assert!(p.label);
        assert!(p.probability > 0.99);
    }
}
