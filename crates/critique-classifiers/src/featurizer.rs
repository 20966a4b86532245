//! Hashed n-gram text featurizer
//!
//! Maps free text to a fixed-width, L2-normalized bag of word and character
//! n-grams. Text is cleaned with the BERT normalizer from `tokenizers`, split
//! into words with the BERT pre-tokenizer, and every n-gram is hashed into one
//! of `dimensions` buckets. Bucket assignment uses SHA-256 so a saved model
//! featurizes identically on every platform and toolchain.

use crate::config::FeaturizerConfig;
use candle_core::{Device, Tensor};
use critique_core::Result;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{
    NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
};

const WORD_NAMESPACE: u8 = b'w';
const CHAR_NAMESPACE: u8 = b'c';

/// Sparse feature vector: sorted bucket indices with their weights
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl FeatureVector {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Deterministic text → feature vector transform
#[derive(Debug)]
pub struct TextFeaturizer {
    config: FeaturizerConfig,
    normalizer: BertNormalizer,
    pre_tokenizer: BertPreTokenizer,
}

impl TextFeaturizer {
    /// Create a new featurizer from configuration
    pub fn new(config: FeaturizerConfig) -> Result<Self> {
        config.validate()?;

        let normalizer = BertNormalizer::new(
            true,
            true,
            Some(config.strip_accents),
            config.lowercase,
        );

        Ok(Self {
            config,
            normalizer,
            pre_tokenizer: BertPreTokenizer,
        })
    }

    pub fn config(&self) -> &FeaturizerConfig {
        &self.config
    }

    /// Width of the dense vectors this featurizer produces
    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Normalize and split text into words
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut normalized = NormalizedString::from(text);
        self.normalizer.normalize(&mut normalized).map_err(|e| {
            critique_core::Error::backend(format!("Text normalization failed: {}", e))
        })?;

        let mut pre_tokenized = PreTokenizedString::from(normalized);
        self.pre_tokenizer
            .pre_tokenize(&mut pre_tokenized)
            .map_err(|e| {
                critique_core::Error::backend(format!("Pre-tokenization failed: {}", e))
            })?;

        Ok(pre_tokenized
            .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
            .into_iter()
            .map(|(word, _, _)| word.to_string())
            .filter(|word| !word.is_empty())
            .collect())
    }

    /// Featurize one text
    pub fn featurize(&self, text: &str) -> Result<FeatureVector> {
        let words = self.tokenize(text)?;
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();

        for n in 1..=self.config.word_ngrams {
            for window in words.windows(n) {
                let gram = window.join(" ");
                *counts.entry(self.bucket(WORD_NAMESPACE, &gram)).or_default() += 1.0;
            }
        }

        if self.config.char_ngrams > 0 {
            for word in &words {
                for gram in char_ngrams(word, self.config.char_ngrams) {
                    *counts.entry(self.bucket(CHAR_NAMESPACE, &gram)).or_default() += 1.0;
                }
            }
        }

        let (indices, values) = counts.into_iter().unzip();
        let mut vector = FeatureVector { indices, values };

        let norm = vector.norm();
        if norm > 0.0 {
            vector.values.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    /// Featurize many texts
    pub fn featurize_batch(&self, texts: &[&str]) -> Result<Vec<FeatureVector>> {
        texts.iter().map(|text| self.featurize(text)).collect()
    }

    /// Stack sparse vectors into a dense `(rows, dimensions)` tensor
    pub fn to_dense<'a, I>(&self, rows: I, device: &Device) -> Result<Tensor>
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        let dims = self.config.dimensions;
        let mut data = Vec::new();
        let mut n_rows = 0usize;

        for row in rows {
            let offset = data.len();
            data.resize(offset + dims, 0f32);
            for (&idx, &value) in row.indices.iter().zip(&row.values) {
                data[offset + idx as usize] = value;
            }
            n_rows += 1;
        }

        Tensor::from_vec(data, (n_rows, dims), device).map_err(|e| {
            critique_core::Error::backend(format!("Failed to create feature tensor: {}", e))
        })
    }

    fn bucket(&self, namespace: u8, gram: &str) -> u32 {
        let mut hasher = Sha256::new();
        hasher.update([namespace]);
        hasher.update(gram.as_bytes());
        let digest = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(prefix) % self.config.dimensions as u64) as u32
    }
}

/// Character n-grams of a word padded with `<` and `>` boundary markers.
/// Words shorter than `n` yield the whole padded word.
fn char_ngrams(word: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = std::iter::once('<')
        .chain(word.chars())
        .chain(std::iter::once('>'))
        .collect();

    if chars.len() <= n {
        return vec![chars.into_iter().collect()];
    }

    chars.windows(n).map(|w| w.iter().collect()).collect()
}
