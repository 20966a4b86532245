//! Logistic regression over hashed n-gram features, trained with Candle
//!
//! The model is a single linear layer (`1 x dimensions` weight plus bias) on
//! top of [`TextFeaturizer`] output. Training minimizes binary cross-entropy
//! with AdamW; weight decay acts as the L2 penalty. Weights start at zero and
//! mini-batches are drawn from a seeded RNG, so a fixed config and data order
//! always produce the same model.

use crate::artifact::{read_artifact, write_artifact, ArtifactManifest};
use crate::classifier::{Classifier, Prediction};
use crate::config::TrainingConfig;
use crate::dataset::class_counts;
use crate::estimator::Estimator;
use crate::featurizer::TextFeaturizer;
use candle_core::{DType, Device, Tensor};
use candle_nn::{AdamW, Init, Linear, Module, Optimizer, ParamsAdamW, VarMap};
use critique_core::{LabeledExample, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Rows per dense tensor at inference time
const PREDICT_BATCH: usize = 256;

const WEIGHT: &str = "weight";
const BIAS: &str = "bias";

/// Candle-backed estimator
pub struct LogisticRegression {
    config: TrainingConfig,
    device: Device,
}

impl LogisticRegression {
    pub const NAME: &'static str = "ngram-logistic-regression";

    /// Create a new estimator, validating the configuration
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let device = config.device.to_device()?;
        Ok(Self { config, device })
    }
}

impl Estimator for LogisticRegression {
    type Model = LogisticModel;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn fit(&self, examples: &[LabeledExample]) -> Result<LogisticModel> {
        let (positive, negative) = class_counts(examples);
        if examples.is_empty() {
            return Err(critique_core::Error::training("no training examples"));
        }
        if positive == 0 || negative == 0 {
            return Err(critique_core::Error::training(format!(
                "training data has a single class ({} positive, {} negative)",
                positive, negative
            )));
        }

        let start = Instant::now();
        let trainer = &self.config.trainer;
        info!(
            "Training {} on {} examples ({} positive, {} negative)",
            Self::NAME,
            examples.len(),
            positive,
            negative
        );

        let featurizer = TextFeaturizer::new(self.config.featurizer.clone())?;
        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let features = featurizer.featurize_batch(&texts)?;
        let targets: Vec<f32> = examples.iter().map(|e| if e.label { 1.0 } else { 0.0 }).collect();

        let varmap = VarMap::new();
        let weight = varmap
            .get((1usize, featurizer.dimensions()), WEIGHT, Init::Const(0.0), DType::F32, &self.device)
            .map_err(backend)?;
        let bias = varmap
            .get(1usize, BIAS, Init::Const(0.0), DType::F32, &self.device)
            .map_err(backend)?;
        let linear = Linear::new(weight, Some(bias));

        let params = ParamsAdamW {
            lr: trainer.learning_rate,
            weight_decay: trainer.l2_regularization,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(varmap.all_vars(), params).map_err(backend)?;

        let mut rng = StdRng::seed_from_u64(trainer.seed);
        let mut order: Vec<usize> = (0..examples.len()).collect();

        for epoch in 1..=trainer.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0f64;

            for batch in order.chunks(trainer.batch_size) {
                let x = featurizer.to_dense(batch.iter().map(|&i| &features[i]), &self.device)?;
                let y = Tensor::from_vec(
                    batch.iter().map(|&i| targets[i]).collect::<Vec<f32>>(),
                    (batch.len(), 1usize),
                    &self.device,
                )
                .map_err(backend)?;

                let logits = linear.forward(&x).map_err(backend)?;
                let loss = bce_with_logits(&logits, &y).map_err(backend)?;
                optimizer.backward_step(&loss).map_err(backend)?;

                epoch_loss += loss.to_scalar::<f32>().map_err(backend)? as f64 * batch.len() as f64;
            }

            let epoch_loss = epoch_loss / examples.len() as f64;
            if !epoch_loss.is_finite() {
                return Err(critique_core::Error::training(format!(
                    "loss diverged at epoch {}",
                    epoch
                )));
            }
            debug!(epoch, loss = epoch_loss, "Epoch complete");
        }

        info!("Training finished in {:.2?}", start.elapsed());

        // Detach from the optimizer's variables
        let weights = linear
            .weight()
            .flatten_all()
            .and_then(|w| w.to_vec1::<f32>())
            .map_err(backend)?;
        let bias = linear
            .bias()
            .map(|b| b.to_vec1::<f32>())
            .transpose()
            .map_err(backend)?
            .and_then(|b| b.first().copied())
            .unwrap_or(0.0);

        LogisticModel::from_parts(
            featurizer,
            weights,
            bias,
            self.config.threshold,
            &self.device,
            examples.len(),
        )
    }

    fn save(&self, model: &LogisticModel, path: &Path) -> Result<()> {
        let manifest = ArtifactManifest::new(
            Self::NAME,
            model.featurizer.config().clone(),
            model.threshold,
            model.trained_examples,
        );
        write_artifact(path, &manifest, &[(WEIGHT, &model.weight), (BIAS, &model.bias)])?;
        info!("Saved model to {}", path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<LogisticModel> {
        let (manifest, tensors) = read_artifact(path, &self.device)?;
        let corrupt = |msg: String| critique_core::Error::corrupt_artifact(path, msg);

        if manifest.estimator != Self::NAME {
            return Err(corrupt(format!(
                "written by estimator '{}', expected '{}'",
                manifest.estimator,
                Self::NAME
            )));
        }

        let featurizer = TextFeaturizer::new(manifest.featurizer.clone())
            .map_err(|e| corrupt(format!("invalid featurizer settings: {}", e)))?;
        let dims = featurizer.dimensions();

        let weight = tensors
            .get(WEIGHT)
            .ok_or_else(|| corrupt(format!("missing tensor '{}'", WEIGHT)))?;
        let bias = tensors
            .get(BIAS)
            .ok_or_else(|| corrupt(format!("missing tensor '{}'", BIAS)))?;

        if weight.dims() != [1, dims] {
            return Err(corrupt(format!(
                "weight shape {:?} does not match featurizer width {}",
                weight.dims(),
                dims
            )));
        }
        if bias.dims() != [1] {
            return Err(corrupt(format!("bias shape {:?}, expected [1]", bias.dims())));
        }

        let model = LogisticModel {
            featurizer,
            weight: weight.to_dtype(DType::F32).map_err(backend)?,
            bias: bias.to_dtype(DType::F32).map_err(backend)?,
            threshold: manifest.threshold,
            device: self.device.clone(),
            trained_examples: manifest.trained_examples,
        };

        info!(
            "Loaded model from {} (trained on {} examples)",
            path.display(),
            model.trained_examples
        );
        Ok(model)
    }
}

/// A fitted logistic regression model; immutable once built
#[derive(Debug)]
pub struct LogisticModel {
    featurizer: TextFeaturizer,
    weight: Tensor,
    bias: Tensor,
    threshold: f32,
    device: Device,
    trained_examples: usize,
}

impl LogisticModel {
    /// Assemble a model from raw parameters
    pub fn from_parts(
        featurizer: TextFeaturizer,
        weights: Vec<f32>,
        bias: f32,
        threshold: f32,
        device: &Device,
        trained_examples: usize,
    ) -> Result<Self> {
        let dims = featurizer.dimensions();
        if weights.len() != dims {
            return Err(critique_core::Error::training(format!(
                "{} weights for {} features",
                weights.len(),
                dims
            )));
        }

        Ok(Self {
            featurizer,
            weight: Tensor::from_vec(weights, (1usize, dims), device).map_err(backend)?,
            bias: Tensor::new(&[bias], device).map_err(backend)?,
            threshold,
            device: device.clone(),
            trained_examples,
        })
    }

    /// Number of rows the model was fitted on
    pub fn trained_examples(&self) -> usize {
        self.trained_examples
    }

    /// Copy of the weight vector
    pub fn weights(&self) -> Result<Vec<f32>> {
        self.weight
            .flatten_all()
            .and_then(|w| w.to_vec1::<f32>())
            .map_err(backend)
    }

    /// Raw logits for a batch of texts
    pub fn scores(&self, texts: &[&str]) -> Result<Vec<f32>> {
        let features = self.featurizer.featurize_batch(texts)?;
        let featureless = features.iter().filter(|f| f.is_empty()).count();
        if featureless > 0 {
            debug!("{} of {} texts produced no features", featureless, texts.len());
        }

        let linear = Linear::new(self.weight.clone(), Some(self.bias.clone()));
        let mut scores = Vec::with_capacity(texts.len());

        for chunk in features.chunks(PREDICT_BATCH) {
            let x = self.featurizer.to_dense(chunk, &self.device)?;
            let logits = linear
                .forward(&x)
                .and_then(|l| l.flatten_all())
                .and_then(|l| l.to_vec1::<f32>())
                .map_err(backend)?;
            scores.extend(logits);
        }

        Ok(scores)
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, texts: &[&str]) -> Result<Vec<Prediction>> {
        Ok(self
            .scores(texts)?
            .into_iter()
            .map(|score| Prediction::from_score(score, self.threshold))
            .collect())
    }

    fn name(&self) -> &str {
        LogisticRegression::NAME
    }

    fn threshold(&self) -> f32 {
        self.threshold
    }
}

/// Numerically stable mean binary cross-entropy on logits:
/// `max(z, 0) - z * y + ln(1 + exp(-|z|))`
fn bce_with_logits(logits: &Tensor, targets: &Tensor) -> candle_core::Result<Tensor> {
    let tail = logits.abs()?.neg()?.exp()?.affine(1.0, 1.0)?.log()?;
    let loss = (logits.relu()? - logits.mul(targets)?)?;
    loss.add(&tail)?.mean_all()
}

fn backend(e: candle_core::Error) -> critique_core::Error {
    critique_core::Error::backend(e.to_string())
}
