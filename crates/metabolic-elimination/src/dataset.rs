//! Named-feature sample records and the labelled dataset container.
//!
//! A `Dataset` is the unit that travels between every stage of the sweep:
//! the raw samples, the reduced samples after an elimination round and the
//! aggregated PARADIGM output are all stored in this shape.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EliminationError, Result};

/// Feature name (reaction or metabolite id) to measured value for one sample.
pub type FeatureRecord = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(with = "stored_records")]
    records: Vec<FeatureRecord>,
    labels: Vec<String>,
}

impl Dataset {
    /// Pair records with labels. Both sequences must have the same length.
    pub fn new(records: Vec<FeatureRecord>, labels: Vec<String>) -> Result<Self> {
        if records.len() != labels.len() {
            return Err(EliminationError::ShapeMismatch(format!(
                "{} records but {} labels",
                records.len(),
                labels.len()
            )));
        }
        Ok(Dataset { records, labels })
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Vec<FeatureRecord>, Vec<String>) {
        (self.records, self.labels)
    }

    /// Subset of rows, in the order of `indices`.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }

    pub fn log_summary(&self) {
        let n_features = self
            .records
            .iter()
            .flat_map(|r| r.keys())
            .collect::<std::collections::HashSet<_>>()
            .len();
        log::info!(
            "Dataset: {} samples, {} distinct features, {} classes",
            self.len(),
            n_features,
            LabelEncoder::fit(&self.labels).classes().len()
        );
    }
}

/// JSON has no NaN or infinity; those values are stored as the strings
/// `"NaN"`, `"inf"` and `"-inf"` and parsed back on load.
mod stored_records {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::FeatureRecord;

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum StoredValue {
        Finite(f64),
        NonFinite(String),
    }

    impl From<f64> for StoredValue {
        fn from(value: f64) -> Self {
            if value.is_finite() {
                StoredValue::Finite(value)
            } else {
                StoredValue::NonFinite(value.to_string())
            }
        }
    }

    pub fn serialize<S: Serializer>(records: &[FeatureRecord], serializer: S) -> Result<S::Ok, S::Error> {
        let stored: Vec<BTreeMap<&str, StoredValue>> = records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .map(|(name, &value)| (name.as_str(), StoredValue::from(value)))
                    .collect()
            })
            .collect();
        stored.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<FeatureRecord>, D::Error> {
        let stored: Vec<BTreeMap<String, StoredValue>> = Vec::deserialize(deserializer)?;
        stored
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|(name, value)| match value {
                        StoredValue::Finite(v) => Ok((name, v)),
                        StoredValue::NonFinite(text) => match text.parse::<f64>() {
                            Ok(v) if !v.is_finite() => Ok((name, v)),
                            _ => Err(D::Error::custom(format!("invalid value {:?} for feature '{}'", text, name))),
                        },
                    })
                    .collect::<Result<FeatureRecord, D::Error>>()
            })
            .collect()
    }
}

/// Maps string class labels to dense indices (sorted unique order).
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit(labels: &[String]) -> Self {
        let mut classes = labels.to_vec();
        classes.sort();
        classes.dedup();
        LabelEncoder { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| EliminationError::InvalidParameter(format!("unknown label '{}'", label)))
            })
            .collect()
    }
}
