//! Core types for critique

use serde::{Deserialize, Serialize};

/// A review with its ground-truth sentiment, used for training and evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// Free-text review
    pub text: String,

    /// `true` for a positive review
    pub label: bool,
}

impl LabeledExample {
    /// Create a new labeled example
    pub fn new(text: impl Into<String>, label: bool) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }

    /// Create a positive example
    pub fn positive(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    /// Create a negative example
    pub fn negative(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }
}

/// A review whose sentiment is to be predicted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionExample {
    pub text: String,
}

impl PredictionExample {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for PredictionExample {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for PredictionExample {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Outcome of running a model over one [`PredictionExample`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Input text, carried through unchanged
    pub text: String,

    /// `true` when the review is predicted positive
    pub predicted_label: bool,

    /// Probability of the positive class (0.0-1.0)
    pub probability: f32,

    /// Raw decision value before the sigmoid
    pub score: f32,
}

impl PredictionResult {
    /// Human-readable label
    pub fn label_name(&self) -> &'static str {
        if self.predicted_label {
            "positive"
        } else {
            "negative"
        }
    }

    /// Probability assigned to the predicted class
    pub fn confidence(&self) -> f32 {
        if self.predicted_label {
            self.probability
        } else {
            1.0 - self.probability
        }
    }
}
