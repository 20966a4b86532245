//! Labeled review loading and train/test splitting

use crate::config::{DatasetFormat, SplitConfig};
use critique_core::{LabeledExample, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Result of partitioning a dataset
#[derive(Debug, Clone, Default)]
pub struct TrainTestSplit {
    pub train: Vec<LabeledExample>,
    pub test: Vec<LabeledExample>,
}

/// Load labeled examples from a delimited file
pub fn load_labeled_examples(path: &Path, format: &DatasetFormat) -> Result<Vec<LabeledExample>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => critique_core::Error::missing_data(path),
        _ => e.into(),
    })?;

    let examples = read_labeled_examples(file, format)?;
    let (positive, negative) = class_counts(&examples);
    info!(
        "Loaded {} examples from {} ({} positive, {} negative)",
        examples.len(),
        path.display(),
        positive,
        negative
    );

    Ok(examples)
}

/// Parse labeled examples from any reader
///
/// Every row must have at least [`DatasetFormat::min_columns`] fields and a
/// label of `0`/`1`/`true`/`false`. Blank lines are skipped. The first bad
/// row aborts the whole load.
pub fn read_labeled_examples<R: Read>(reader: R, format: &DatasetFormat) -> Result<Vec<LabeledExample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(format.delimiter_byte()?)
        .has_headers(format.has_header)
        .quoting(format.allow_quoting)
        .flexible(true)
        .from_reader(reader);

    let mut examples = Vec::new();

    for record in rdr.records() {
        let record = record.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            critique_core::Error::malformed(line, e.to_string())
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < format.min_columns() {
            return Err(critique_core::Error::malformed(
                line,
                format!(
                    "expected at least {} columns, found {}",
                    format.min_columns(),
                    record.len()
                ),
            ));
        }

        let text = &record[format.text_column];
        let label = parse_label(&record[format.label_column])
            .ok_or_else(|| {
                critique_core::Error::malformed(
                    line,
                    format!("label '{}' is not a boolean", &record[format.label_column]),
                )
            })?;

        examples.push(LabeledExample::new(text, label));
    }

    debug!("Parsed {} labeled rows", examples.len());
    Ok(examples)
}

/// Shuffle and partition examples, holding out `test_fraction` of each class
///
/// The split is stratified: every class keeps at least one training row, so
/// data with both labels always yields a two-class training side.
pub fn train_test_split(mut examples: Vec<LabeledExample>, config: &SplitConfig) -> Result<TrainTestSplit> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    examples.shuffle(&mut rng);

    let n = examples.len();
    let (positive, negative): (Vec<_>, Vec<_>) = examples.into_iter().partition(|e| e.label);

    let mut train = Vec::with_capacity(n);
    let mut test = Vec::new();
    for mut class in [positive, negative] {
        let n_test = held_out_count(class.len(), config.test_fraction);
        train.extend(class.split_off(n_test));
        test.append(&mut class);
    }

    // undo the grouping by label
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    debug!("Split {} examples into {} train / {} test", n, train.len(), test.len());

    Ok(TrainTestSplit { train, test })
}

/// Count (positive, negative) labels
pub fn class_counts(examples: &[LabeledExample]) -> (usize, usize) {
    let positive = examples.iter().filter(|e| e.label).count();
    (positive, examples.len() - positive)
}

/// Rows of one class to hold out, leaving at least one for training
fn held_out_count(class_len: usize, test_fraction: f64) -> usize {
    let n_test = ((class_len as f64) * test_fraction).round() as usize;
    n_test.min(class_len.saturating_sub(1))
}

fn parse_label(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
