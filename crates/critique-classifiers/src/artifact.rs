//! Single-file model artifact
//!
//! A model is persisted as one zip archive holding:
//! - `manifest.json`: format version, estimator name, featurizer settings,
//!   decision threshold and training metadata
//! - `weights.safetensors`: the fitted tensors
//!
//! Writes go to a temporary sibling and are renamed into place, so readers
//! never observe a partially written archive at the target path.

use crate::config::FeaturizerConfig;
use candle_core::{Device, Tensor};
use critique_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Bumped whenever the archive layout or tensor naming changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

const MANIFEST_ENTRY: &str = "manifest.json";
const WEIGHTS_ENTRY: &str = "weights.safetensors";

/// Metadata stored next to the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,

    /// Name of the estimator that produced the weights
    pub estimator: String,

    /// Featurizer the weights were trained against
    pub featurizer: FeaturizerConfig,

    /// Decision threshold on the positive-class probability
    pub threshold: f32,

    /// Number of rows the model was fitted on
    pub trained_examples: usize,

    /// Seconds since the Unix epoch at save time
    pub created_at: u64,
}

impl ArtifactManifest {
    /// Create a manifest stamped with the current time
    pub fn new(
        estimator: impl Into<String>,
        featurizer: FeaturizerConfig,
        threshold: f32,
        trained_examples: usize,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            estimator: estimator.into(),
            featurizer,
            threshold,
            trained_examples,
            created_at,
        }
    }
}

/// Write manifest and tensors to `path`, replacing any existing file
pub fn write_artifact(
    path: &Path,
    manifest: &ArtifactManifest,
    tensors: &[(&str, &Tensor)],
) -> Result<()> {
    let manifest_json = serde_json::to_vec_pretty(manifest)?;
    let weights = safetensors::serialize(tensors.iter().map(|(name, t)| (*name, *t)), &None)
        .map_err(|e| critique_core::Error::backend(format!("Failed to serialize weights: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_sibling(path);
    let result = write_zip(&tmp_path, &manifest_json, &weights)
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(Into::into));

    if result.is_err() {
        std::fs::remove_file(&tmp_path).ok();
    } else {
        debug!(
            "Wrote model artifact {} ({} weight bytes)",
            path.display(),
            weights.len()
        );
    }

    result
}

/// Read manifest and tensors from `path` onto `device`
pub fn read_artifact(path: &Path, device: &Device) -> Result<(ArtifactManifest, HashMap<String, Tensor>)> {
    let file = File::open(path)?;
    let corrupt = |msg: String| critique_core::Error::corrupt_artifact(path, msg);

    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| corrupt(format!("not a zip archive: {}", e)))?;

    let manifest: ArtifactManifest = {
        let mut entry = archive
            .by_name(MANIFEST_ENTRY)
            .map_err(|e| corrupt(format!("missing {}: {}", MANIFEST_ENTRY, e)))?;
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| corrupt(format!("unreadable {}: {}", MANIFEST_ENTRY, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| corrupt(format!("invalid {}: {}", MANIFEST_ENTRY, e)))?
    };

    if manifest.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {} (expected {})",
            manifest.format_version, ARTIFACT_FORMAT_VERSION
        )));
    }

    let weights = {
        let mut entry = archive
            .by_name(WEIGHTS_ENTRY)
            .map_err(|e| corrupt(format!("missing {}: {}", WEIGHTS_ENTRY, e)))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| corrupt(format!("unreadable {}: {}", WEIGHTS_ENTRY, e)))?;
        bytes
    };

    let tensors = candle_core::safetensors::load_buffer(&weights, device)
        .map_err(|e| corrupt(format!("invalid weights: {}", e)))?;

    Ok((manifest, tensors))
}

fn write_zip(path: &Path, manifest_json: &[u8], weights: &[u8]) -> Result<()> {
    let zip_err = |e: zip::result::ZipError| {
        critique_core::Error::backend(format!("Failed to write model archive: {}", e))
    };

    let file = File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, options).map_err(zip_err)?;
    zip.write_all(manifest_json)?;
    zip.start_file(WEIGHTS_ENTRY, options).map_err(zip_err)?;
    zip.write_all(weights)?;

    let file = zip.finish().map_err(zip_err)?;
    file.sync_all()?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model.zip".into());
    name.push(".tmp");
    path.with_file_name(name)
}
