//! Conversion between named-feature records and dense matrices.
//!
//! `DictVectorizer` fixes a vocabulary (column order) once per elimination
//! round; `InverseDictVectorizer` uses that vocabulary together with a fitted
//! `SelectNotKBest` to turn the reduced matrix back into named records.
use std::collections::HashMap;

use ndarray::Array2;

use crate::dataset::FeatureRecord;
use crate::error::{EliminationError, Result};
use crate::feature_selection::{ScoreFunction, SelectNotKBest};

#[derive(Debug, Clone, Default)]
pub struct DictVectorizer {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
}

impl DictVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of feature names in first-seen order.
    pub fn fit(&mut self, records: &[FeatureRecord]) -> &mut Self {
        self.vocabulary.clear();
        self.index.clear();
        for record in records {
            for name in record.keys() {
                if !self.index.contains_key(name) {
                    self.index.insert(name.clone(), self.vocabulary.len());
                    self.vocabulary.push(name.clone());
                }
            }
        }
        self
    }

    /// Dense matrix against the fitted vocabulary. Names outside the
    /// vocabulary are ignored, absent names are zero.
    pub fn transform(&self, records: &[FeatureRecord]) -> Array2<f64> {
        let mut x = Array2::zeros((records.len(), self.vocabulary.len()));
        for (row, record) in records.iter().enumerate() {
            for (name, &value) in record {
                if let Some(&col) = self.index.get(name) {
                    x[[row, col]] = value;
                }
            }
        }
        x
    }

    pub fn fit_transform(&mut self, records: &[FeatureRecord]) -> Array2<f64> {
        self.fit(records);
        self.transform(records)
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

/// Rebuild records from a full matrix, keeping only the columns in `mask`.
///
/// Zero values of retained columns are kept; zero is an observed value here.
pub fn inverse_transform(x: &Array2<f64>, vocabulary: &[String], mask: &[usize]) -> Result<Vec<FeatureRecord>> {
    if x.ncols() != vocabulary.len() {
        return Err(EliminationError::ShapeMismatch(format!(
            "matrix has {} columns but vocabulary has {} names",
            x.ncols(),
            vocabulary.len()
        )));
    }
    if let Some(&bad) = mask.iter().find(|&&i| i >= vocabulary.len()) {
        return Err(EliminationError::ShapeMismatch(format!(
            "mask index {} outside vocabulary of {}",
            bad,
            vocabulary.len()
        )));
    }

    Ok(x
        .rows()
        .into_iter()
        .map(|row| mask.iter().map(|&i| (vocabulary[i].clone(), row[i])).collect())
        .collect())
}

/// Maps the output of a fitted selector back to named records.
pub struct InverseDictVectorizer<'a> {
    vocabulary: &'a [String],
    support: &'a [usize],
}

impl<'a> InverseDictVectorizer<'a> {
    pub fn new<S: ScoreFunction>(vectorizer: &'a DictVectorizer, selector: &'a SelectNotKBest<S>) -> Self {
        InverseDictVectorizer {
            vocabulary: vectorizer.vocabulary(),
            support: selector.support(),
        }
    }

    /// `selected` is the selector's output: column `j` is vocabulary entry `support[j]`.
    pub fn transform(&self, selected: &Array2<f64>) -> Result<Vec<FeatureRecord>> {
        if selected.ncols() != self.support.len() {
            return Err(EliminationError::ShapeMismatch(format!(
                "selected matrix has {} columns but {} features were retained",
                selected.ncols(),
                self.support.len()
            )));
        }
        if let Some(&bad) = self.support.iter().find(|&&i| i >= self.vocabulary.len()) {
            return Err(EliminationError::ShapeMismatch(format!(
                "retained column {} outside vocabulary of {}",
                bad,
                self.vocabulary.len()
            )));
        }

        Ok(selected
            .rows()
            .into_iter()
            .map(|row| {
                self.support
                    .iter()
                    .zip(row.iter())
                    .map(|(&col, &value)| (self.vocabulary[col].clone(), value))
                    .collect()
            })
            .collect())
    }
}
