//! Labelled sample table (TSV) reader.
//!
//! One row per sample, one label column, an optional id column and numeric
//! feature columns named by reaction or metabolite id. Empty cells are
//! treated as absent features rather than zeros.
use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::dataset::{Dataset, FeatureRecord};

/// Configuration for reading sample tables.
#[derive(Debug, Clone)]
pub struct SampleReaderConfig {
    /// Column name holding class labels.
    pub label_column: String,
    /// Optional sample identifier column; ignored apart from being skipped.
    pub id_column: Option<String>,
    /// Columns that are neither label nor features.
    pub ignore_columns: Vec<String>,
    pub delimiter: u8,
}

impl Default for SampleReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "label".to_string(),
            id_column: Some("id".to_string()),
            ignore_columns: Vec::new(),
            delimiter: b'\t',
        }
    }
}

/// Read a sample table with the default configuration.
pub fn read_samples_tsv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    read_samples_tsv_with_config(path, &SampleReaderConfig::default())
}

/// Read a sample table using a custom configuration.
pub fn read_samples_tsv_with_config<P: AsRef<Path>>(path: P, config: &SampleReaderConfig) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open sample table: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read sample table header row")?
        .clone();

    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;
    let id_idx = config
        .id_column
        .as_deref()
        .and_then(|name| find_column(&headers, name));

    let ignore: HashSet<String> = config
        .ignore_columns
        .iter()
        .map(|name| name.to_ascii_lowercase())
        .collect();
    let feature_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(idx, header)| {
            *idx != label_idx && Some(*idx) != id_idx && !ignore.contains(&header.to_ascii_lowercase())
        })
        .map(|(idx, _)| idx)
        .collect();
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns detected in sample table header"));
    }

    let mut records = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let label = record
            .get(label_idx)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .ok_or_else(|| anyhow!("Missing label value at row {}", row_idx + 1))?;
        labels.push(label.to_string());

        let mut features = FeatureRecord::new();
        for &idx in &feature_indices {
            let value = record.get(idx).unwrap_or_default().trim();
            if value.is_empty() {
                continue;
            }
            let parsed = value.parse::<f64>().with_context(|| {
                format!(
                    "Invalid feature '{}' at row {}",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1
                )
            })?;
            features.insert(headers.get(idx).unwrap_or("").to_string(), parsed);
        }
        records.push(features);
    }

    let dataset = Dataset::new(records, labels)?;
    log::debug!(
        "Read {} samples with {} feature columns from {}",
        dataset.len(),
        feature_indices.len(),
        path.as_ref().display()
    );
    Ok(dataset)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_labels_and_sparse_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bc.tsv");
        std::fs::write(&path, "id\tlabel\tR1\tR2\n0\tbc\t1.5\t\n1\th\t0\t-2\n").unwrap();

        let ds = read_samples_tsv(&path).unwrap();
        assert_eq!(ds.labels(), &["bc".to_string(), "h".to_string()]);
        assert_eq!(ds.records()[0].len(), 1);
        assert_eq!(ds.records()[0]["R1"], 1.5);
        assert_eq!(ds.records()[1]["R1"], 0.0);
        assert_eq!(ds.records()[1]["R2"], -2.0);
    }

    #[test]
    fn rejects_non_numeric_features_and_missing_label_column() {
        let dir = tempfile::tempdir().unwrap();
        let bad_value = dir.path().join("bad.tsv");
        std::fs::write(&bad_value, "label\tR1\nbc\tabc\n").unwrap();
        assert!(read_samples_tsv(&bad_value).is_err());

        let no_label = dir.path().join("nolabel.tsv");
        std::fs::write(&no_label, "id\tR1\n0\t1\n").unwrap();
        let err = read_samples_tsv(&no_label).unwrap_err();
        assert!(err.to_string().contains("label"));
    }
}
