//! Acquisition and run orchestration against a mock estimator
//!
//! The mock records how often it is asked to fit, save and load, so the tests
//! can check which branch of model acquisition ran and what touched disk.

use critique::demo::predict;
use critique::{
    acquire_model, run, Acquisition, AppConfig, AppContext, CorruptModelPolicy, EvaluationSet,
};
use critique_classifiers::{Classifier, Estimator, Prediction};
use critique_core::{Error, LabeledExample, PredictionExample, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

const MAGIC: &str = "mock-model";

/// Scores a text `+strength` if it contains the keyword, `-strength` otherwise
#[derive(Debug, Clone, PartialEq)]
pub struct MockModel {
    keyword: String,
    strength: f32,
}

impl Classifier for MockModel {
    fn predict(&self, texts: &[&str]) -> Result<Vec<Prediction>> {
        Ok(texts
            .iter()
            .map(|text| {
                let score = if text.contains(&self.keyword) {
                    self.strength
                } else {
                    -self.strength
                };
                Prediction::from_score(score, self.threshold())
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock estimator with call counters
pub struct MockEstimator {
    keyword: String,
    fit_calls: AtomicU32,
    save_calls: AtomicU32,
    load_calls: AtomicU32,
}

impl MockEstimator {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            fit_calls: AtomicU32::new(0),
            save_calls: AtomicU32::new(0),
            load_calls: AtomicU32::new(0),
        }
    }

    pub fn fit_calls(&self) -> u32 {
        self.fit_calls.load(Ordering::Relaxed)
    }

    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::Relaxed)
    }

    pub fn load_calls(&self) -> u32 {
        self.load_calls.load(Ordering::Relaxed)
    }
}

impl Estimator for MockEstimator {
    type Model = MockModel;

    fn name(&self) -> &str {
        "mock"
    }

    fn fit(&self, examples: &[LabeledExample]) -> Result<MockModel> {
        self.fit_calls.fetch_add(1, Ordering::Relaxed);
        if examples.is_empty() {
            return Err(Error::training("no examples"));
        }
        if examples.iter().all(|e| e.label) || examples.iter().all(|e| !e.label) {
            return Err(Error::training("single class"));
        }
        Ok(MockModel {
            keyword: self.keyword.clone(),
            strength: examples.len() as f32 / 4.0,
        })
    }

    fn save(&self, model: &MockModel, path: &Path) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::Relaxed);
        std::fs::write(path, format!("{MAGIC}\t{}\t{}", model.keyword, model.strength))?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<MockModel> {
        self.load_calls.fetch_add(1, Ordering::Relaxed);
        let content = std::fs::read_to_string(path)?;
        let parts: Vec<&str> = content.split('\t').collect();

        match parts.as_slice() {
            [MAGIC, keyword, strength] => {
                let strength = strength
                    .parse()
                    .map_err(|_| Error::corrupt_artifact(path, "bad strength"))?;
                Ok(MockModel {
                    keyword: keyword.to_string(),
                    strength,
                })
            }
            _ => Err(Error::corrupt_artifact(path, "not a mock model")),
        }
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn data_path(&self) -> PathBuf {
        self.dir.path().join("train.txt")
    }

    fn model_path(&self) -> PathBuf {
        self.dir.path().join("model.zip")
    }

    fn write_data(&self, rows_per_class: usize) {
        let mut content = String::from("SentimentText\tSentiment\n");
        for i in 0..rows_per_class {
            content.push_str(&format!("episode {i} was great\t1\n"));
            content.push_str(&format!("episode {i} was dull\t0\n"));
        }
        std::fs::write(self.data_path(), content).unwrap();
    }

    fn write_imbalanced_data(&self, positive: usize, negative: usize) {
        let mut content = String::from("SentimentText\tSentiment\n");
        for i in 0..positive {
            content.push_str(&format!("episode {i} was great\t1\n"));
        }
        for i in 0..negative {
            content.push_str(&format!("episode {i} was dull\t0\n"));
        }
        std::fs::write(self.data_path(), content).unwrap();
    }

    fn file_count(&self) -> usize {
        std::fs::read_dir(self.dir.path()).unwrap().count()
    }

    fn context(&self, estimator: MockEstimator) -> AppContext<MockEstimator> {
        let config = AppConfig {
            data_path: self.data_path(),
            model_path: self.model_path(),
            ..Default::default()
        };
        AppContext::new(config, estimator)
    }
}

#[test]
fn test_existing_model_is_loaded_without_training_data() {
    let ws = Workspace::new();
    std::fs::write(ws.model_path(), format!("{MAGIC}\tsuperb\t2.5")).unwrap();
    assert!(!ws.data_path().exists());

    let ctx = ws.context(MockEstimator::new("great"));
    let acquisition = acquire_model(&ctx).unwrap();

    assert!(!acquisition.was_trained());
    assert!(acquisition.metrics().is_none());
    assert_eq!(ctx.estimator.fit_calls(), 0);
    assert_eq!(ctx.estimator.save_calls(), 0);
    assert_eq!(
        acquisition.model(),
        &MockModel {
            keyword: "superb".to_string(),
            strength: 2.5,
        }
    );
}

#[test]
fn test_train_persists_then_second_run_loads() {
    let ws = Workspace::new();
    ws.write_data(10);
    assert_eq!(ws.file_count(), 1);

    let ctx = ws.context(MockEstimator::new("great"));
    let first = acquire_model(&ctx).unwrap();

    assert!(first.was_trained());
    let metrics = first.metrics().unwrap();
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(ctx.estimator.fit_calls(), 1);
    assert_eq!(ctx.estimator.save_calls(), 1);
    assert_eq!(ws.file_count(), 2);
    assert!(ws.model_path().exists());

    let second = acquire_model(&ctx).unwrap();
    assert!(!second.was_trained());
    assert_eq!(ctx.estimator.fit_calls(), 1);
    assert_eq!(ctx.estimator.load_calls(), 1);
    assert_eq!(ws.file_count(), 2);
    assert_eq!(first.model(), second.model());
}

#[test]
fn test_minority_class_of_two_still_trains() {
    let ws = Workspace::new();
    ws.write_imbalanced_data(18, 2);

    let ctx = ws.context(MockEstimator::new("great"));
    let acquisition = acquire_model(&ctx).unwrap();

    assert!(acquisition.was_trained());
    assert_eq!(acquisition.evaluation_set(), Some(EvaluationSet::HeldOut));
    assert_eq!(ctx.estimator.fit_calls(), 1);
    assert_eq!(ws.file_count(), 2);
    assert!(ws.model_path().exists());
}

#[test]
fn test_tiny_dataset_reports_training_metrics() {
    let ws = Workspace::new();
    ws.write_data(2);

    let ctx = ws.context(MockEstimator::new("great"));
    let mut out = Vec::new();
    let summary = run(&ctx, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.evaluation_set, Some(EvaluationSet::Training));
    assert!(text.contains("metrics are over the training data"));
    assert!(text.contains("Accuracy:"));
}

#[test]
fn test_missing_data_without_model_is_fatal() {
    let ws = Workspace::new();
    let ctx = ws.context(MockEstimator::new("great"));

    let err = acquire_model(&ctx).err().unwrap();
    assert!(matches!(err, Error::MissingData { .. }));
    assert_eq!(ctx.estimator.fit_calls(), 0);
    assert!(!ws.model_path().exists());
}

#[test]
fn test_corrupt_model_aborts_by_default() {
    let ws = Workspace::new();
    ws.write_data(5);
    std::fs::write(ws.model_path(), "garbage").unwrap();

    let ctx = ws.context(MockEstimator::new("great"));
    let err = acquire_model(&ctx).err().unwrap();

    assert!(err.is_corrupt_artifact());
    assert_eq!(ctx.estimator.fit_calls(), 0);
    assert_eq!(std::fs::read_to_string(ws.model_path()).unwrap(), "garbage");
}

#[test]
fn test_corrupt_model_retrains_when_configured() {
    let ws = Workspace::new();
    ws.write_data(5);
    std::fs::write(ws.model_path(), "garbage").unwrap();

    let mut ctx = ws.context(MockEstimator::new("great"));
    ctx.config.on_corrupt_model = CorruptModelPolicy::Retrain;

    let acquisition = acquire_model(&ctx).unwrap();
    assert!(acquisition.was_trained());
    assert_eq!(ctx.estimator.fit_calls(), 1);
    assert!(std::fs::read_to_string(ws.model_path())
        .unwrap()
        .starts_with(MAGIC));
}

#[test]
fn test_retrain_flag_ignores_existing_model() {
    let ws = Workspace::new();
    ws.write_data(5);
    std::fs::write(ws.model_path(), format!("{MAGIC}\tsuperb\t2.5")).unwrap();

    let mut ctx = ws.context(MockEstimator::new("great"));
    ctx.config.retrain = true;

    let acquisition = acquire_model(&ctx).unwrap();
    assert!(acquisition.was_trained());
    assert_eq!(ctx.estimator.load_calls(), 0);
    assert_eq!(acquisition.model().keyword, "great");
}

#[test]
fn test_malformed_data_reports_line() {
    let ws = Workspace::new();
    std::fs::write(
        ws.data_path(),
        "SentimentText\tSentiment\ngood\t1\nbad\tmaybe\n",
    )
    .unwrap();

    let ctx = ws.context(MockEstimator::new("great"));
    let err = acquire_model(&ctx).err().unwrap();

    assert!(matches!(err, Error::MalformedData { line: 3, .. }));
}

#[test]
fn test_predictions_keep_order_and_agree_with_probability() {
    let model = MockModel {
        keyword: "great".to_string(),
        strength: 1.5,
    };
    let examples: Vec<PredictionExample> = ["a great show", "so dull", "", "great"]
        .into_iter()
        .map(PredictionExample::from)
        .collect();

    let results = predict(&model, &examples).unwrap();

    assert_eq!(results.len(), examples.len());
    for (example, result) in examples.iter().zip(&results) {
        assert_eq!(example.text, result.text);
        assert_eq!(result.predicted_label, result.probability >= 0.5);
    }
    assert!(results[0].predicted_label);
    assert!(!results[1].predicted_label);
}

#[test]
fn test_run_prints_metrics_only_when_trained() {
    let ws = Workspace::new();
    ws.write_data(10);

    let mut ctx = ws.context(MockEstimator::new("great"));
    ctx.config.reviews = vec!["a great finale".to_string(), "a dull finale".to_string()];

    let mut out = Vec::new();
    let summary = run(&ctx, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(summary.was_trained());
    assert_eq!(summary.evaluation_set, Some(EvaluationSet::HeldOut));
    assert!(text.contains("Accuracy:"));
    assert!(!text.contains("training data"));
    assert!(text.contains("Review: a great finale\nPrediction: Positive review"));
    assert!(text.contains("Review: a dull finale\nPrediction: Negative review"));

    let mut out = Vec::new();
    let summary = run(&ctx, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(!summary.was_trained());
    assert!(!text.contains("Accuracy:"));
    assert_eq!(summary.results.len(), 2);
}

#[test]
fn test_loaded_acquisition_into_model() {
    let model = MockModel {
        keyword: "k".to_string(),
        strength: 1.0,
    };
    let acquisition = Acquisition::Loaded(model.clone());
    assert_eq!(acquisition.into_model(), model);
}
