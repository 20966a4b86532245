//! Configuration for featurization, training and data loading

use candle_core::Device;
use critique_core::Result;
use serde::{Deserialize, Serialize};

/// Everything needed to fit a model from raw labeled rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Text featurization
    #[serde(default)]
    pub featurizer: FeaturizerConfig,

    /// Optimizer settings
    #[serde(default)]
    pub trainer: TrainerConfig,

    /// Train/test partitioning
    #[serde(default)]
    pub split: SplitConfig,

    /// Decision threshold on the positive-class probability
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Device to train and predict on
    #[serde(default)]
    pub device: DeviceSpec,
}

/// Hashed n-gram featurizer settings
///
/// Persisted inside the model artifact: a model only makes sense together
/// with the featurizer it was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturizerConfig {
    /// Number of hash buckets (feature vector width)
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Longest word n-gram; 0 disables word features
    #[serde(default = "default_word_ngrams")]
    pub word_ngrams: usize,

    /// Character n-gram length; 0 disables character features
    #[serde(default = "default_char_ngrams")]
    pub char_ngrams: usize,

    /// Lowercase before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Remove diacritics before tokenizing
    #[serde(default = "default_true")]
    pub strip_accents: bool,
}

/// Logistic regression optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Passes over the training set
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// AdamW learning rate
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// L2 regularization strength (AdamW weight decay)
    #[serde(default = "default_l2")]
    pub l2_regularization: f64,

    /// Mini-batch size
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seed for mini-batch shuffling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Train/test split settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Seed for the split; `None` draws from entropy
    #[serde(default = "default_split_seed")]
    pub seed: Option<u64>,
}

/// Layout of the delimited training-data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFormat {
    /// Field separator
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// First row is a header
    #[serde(default = "default_true")]
    pub has_header: bool,

    /// Honor double-quoted fields
    #[serde(default = "default_true")]
    pub allow_quoting: bool,

    /// Zero-based column of the review text
    #[serde(default)]
    pub text_column: usize,

    /// Zero-based column of the label
    #[serde(default = "default_label_column")]
    pub label_column: usize,
}

/// Device specification (for config files)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda {
        index: Option<usize>,
    },
    Metal {
        index: Option<usize>,
    },
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            featurizer: FeaturizerConfig::default(),
            trainer: TrainerConfig::default(),
            split: SplitConfig::default(),
            threshold: default_threshold(),
            device: DeviceSpec::Cpu,
        }
    }
}

impl Default for FeaturizerConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            word_ngrams: default_word_ngrams(),
            char_ngrams: default_char_ngrams(),
            lowercase: true,
            strip_accents: true,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            l2_regularization: default_l2(),
            batch_size: default_batch_size(),
            seed: default_seed(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_split_seed(),
        }
    }
}

impl Default for DatasetFormat {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_header: true,
            allow_quoting: true,
            text_column: 0,
            label_column: default_label_column(),
        }
    }
}

impl TrainingConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| critique_core::Error::config(format!("invalid training config: {e}")))
    }

    /// Reject values that would make training meaningless
    pub fn validate(&self) -> Result<()> {
        self.featurizer.validate()?;
        self.trainer.validate()?;
        self.split.validate()?;

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(critique_core::Error::config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }

        Ok(())
    }
}

impl FeaturizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 || self.dimensions > u32::MAX as usize {
            return Err(critique_core::Error::config(format!(
                "featurizer dimensions must be within [1, {}], got {}",
                u32::MAX,
                self.dimensions
            )));
        }
        if self.word_ngrams == 0 && self.char_ngrams == 0 {
            return Err(critique_core::Error::config(
                "featurizer needs word or character n-grams",
            ));
        }
        Ok(())
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(critique_core::Error::config("trainer epochs must be positive"));
        }
        if self.batch_size == 0 {
            return Err(critique_core::Error::config("trainer batch_size must be positive"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(critique_core::Error::config(format!(
                "trainer learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.l2_regularization < 0.0 {
            return Err(critique_core::Error::config(format!(
                "trainer l2_regularization must not be negative, got {}",
                self.l2_regularization
            )));
        }
        Ok(())
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(critique_core::Error::config(format!(
                "split test_fraction must be within [0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

impl DatasetFormat {
    /// Delimiter as the single byte the reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| {
                critique_core::Error::config(format!(
                    "delimiter must be a single ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }

    /// Number of columns a row must have at least
    pub fn min_columns(&self) -> usize {
        self.text_column.max(self.label_column) + 1
    }
}

impl DeviceSpec {
    /// Create the Candle device
    pub fn to_device(&self) -> Result<Device> {
        match self {
            DeviceSpec::Cpu => Ok(Device::Cpu),
            DeviceSpec::Cuda { index } => Device::new_cuda(index.unwrap_or(0)).map_err(|e| {
                critique_core::Error::backend(format!("Failed to create CUDA device: {}", e))
            }),
            DeviceSpec::Metal { index } => Device::new_metal(index.unwrap_or(0)).map_err(|e| {
                critique_core::Error::backend(format!("Failed to create Metal device: {}", e))
            }),
        }
    }
}

fn default_threshold() -> f32 {
    crate::classifier::DEFAULT_THRESHOLD
}

fn default_dimensions() -> usize {
    1 << 14
}

fn default_word_ngrams() -> usize {
    2
}

fn default_char_ngrams() -> usize {
    3
}

fn default_epochs() -> usize {
    20
}

fn default_learning_rate() -> f64 {
    0.05
}

fn default_l2() -> f64 {
    1e-4
}

fn default_batch_size() -> usize {
    32
}

fn default_seed() -> u64 {
    42
}

fn default_test_fraction() -> f64 {
    0.1
}

fn default_split_seed() -> Option<u64> {
    Some(42)
}

fn default_delimiter() -> char {
    '\t'
}

fn default_label_column() -> usize {
    1
}

fn default_true() -> bool {
    true
}
