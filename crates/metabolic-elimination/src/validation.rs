//! Stratified cross-validation used to score sweep pipelines.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::dataset::{Dataset, LabelEncoder};
use crate::error::{EliminationError, Result};
use crate::pipeline::PipelineSpec;

/// K-fold splitter that keeps class proportions roughly equal in every fold.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_splits: usize,
    shuffle_seed: Option<u64>,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, shuffle_seed: Option<u64>) -> Result<Self> {
        if n_splits < 2 {
            return Err(EliminationError::InvalidParameter(format!(
                "at least 2 splits are required, got {}",
                n_splits
            )));
        }
        Ok(StratifiedKFold {
            n_splits,
            shuffle_seed,
        })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// (train, test) index pairs, one per fold.
    ///
    /// Samples of each class are dealt to folds in turn; the deal continues
    /// across classes so fold sizes differ by at most one.
    pub fn split(&self, y: &[usize]) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits > y.len() {
            return Err(EliminationError::InvalidParameter(format!(
                "cannot split {} samples into {} folds",
                y.len(),
                self.n_splits
            )));
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut rng = self.shuffle_seed.map(StdRng::seed_from_u64);
        let mut fold_of = vec![0usize; y.len()];
        let mut dealt = 0usize;
        for class in classes {
            let mut members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            if let Some(rng) = rng.as_mut() {
                members.shuffle(rng);
            }
            for i in members {
                fold_of[i] = dealt % self.n_splits;
                dealt += 1;
            }
        }

        Ok((0..self.n_splits)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) = (0..y.len()).partition(|&i| fold_of[i] == fold);
                (train, test)
            })
            .collect())
    }
}

/// Micro-averaged F1. For single-label predictions this equals accuracy.
pub fn f1_micro(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(EliminationError::ShapeMismatch(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Score a pipeline on every fold. Folds are fitted in parallel, each with a
/// freshly built pipeline.
pub fn cross_val_score(spec: &PipelineSpec, dataset: &Dataset, k: usize, cv: &StratifiedKFold) -> Result<Vec<f64>> {
    let encoder = LabelEncoder::fit(dataset.labels());
    let y = encoder.transform(dataset.labels())?;
    let folds = cv.split(&y)?;

    folds
        .par_iter()
        .map(|(train, test)| {
            let train_set = dataset.select_rows(train);
            let train_y = train.iter().map(|&i| y[i]).collect::<Vec<_>>();
            let test_set = dataset.select_rows(test);
            let test_y = test.iter().map(|&i| y[i]).collect::<Vec<_>>();

            let mut pipeline = spec.build(k)?;
            pipeline.fit(train_set.records(), &train_y)?;
            let predicted = pipeline.predict(test_set.records())?;
            f1_micro(&test_y, &predicted)
        })
        .collect()
}

pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return f64::NAN;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}
