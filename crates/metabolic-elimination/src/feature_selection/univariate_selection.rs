//! Univariate feature scoring and best-k elimination following scikit-learn's API.
//!
//! See: https://scikit-learn.org/stable/modules/feature_selection.html#univariate-feature-selection
//!
//! The selector in this module answers the inverse of the usual question: it
//! removes the `k` strongest columns and keeps everything else, so a sweep over
//! `k` shows how a model degrades as its best predictors disappear.

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::error::{EliminationError, Result};

/// Compute row-wise (squared) Euclidean norms of a 2D array.
///
/// # Parameters
///
/// * `x` - A 2D array of shape (n_samples, n_features).
/// * `squared` - Return squared norms instead of the regular norms.
pub fn row_norms<S>(x: &ArrayBase<S, Ix2>, squared: bool) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    let mut norms = Array1::zeros(x.nrows());

    for (i, row) in x.axis_iter(Axis(0)).enumerate() {
        let sum_of_squares: f64 = row.iter().map(|&val| val.powi(2)).sum();
        norms[i] = if squared {
            sum_of_squares
        } else {
            sum_of_squares.sqrt()
        };
    }

    norms
}

/// Compute Pearson's r for each feature and the target.
///
/// # Parameters
///
/// * `x` - Data matrix of shape (n_samples, n_features).
/// * `y` - Target vector of shape (n_samples,).
/// * `center` - Center both `x` and `y` by subtracting their means.
/// * `force_finite` - Replace non-finite coefficients (constant columns) with 0.0.
///
/// # Returns
///
/// An array of shape (n_features,) with one correlation coefficient per column.
pub fn r_regression(x: &Array2<f64>, y: &Array1<f64>, center: bool, force_finite: bool) -> Array1<f64> {
    let n_samples = x.nrows() as f64;
    let n_features = x.ncols();

    let mut y_centered = y.to_owned();
    let mut x_means = Array1::zeros(n_features);

    let x_norms = if center {
        let y_mean = y.sum() / n_samples;
        y_centered -= y_mean;

        for (i, col) in x.columns().into_iter().enumerate() {
            x_means[i] = col.sum() / n_samples;
        }

        // Scaled standard deviations via moments
        let x_squared_norms = row_norms(&x.t(), true);
        (&x_squared_norms - &(x_means.mapv(|m: f64| m.powi(2)) * n_samples))
            .mapv(|v| v.max(0.0).sqrt())
    } else {
        row_norms(&x.t(), false)
    };

    let mut correlation_coefficient = Array1::zeros(n_features);
    for (i, col) in x.columns().into_iter().enumerate() {
        let centered_col = if center {
            col.mapv(|v| v - x_means[i])
        } else {
            col.to_owned()
        };
        correlation_coefficient[i] = centered_col.dot(&y_centered);
    }

    let y_norm = y_centered.dot(&y_centered).sqrt();

    correlation_coefficient /= &x_norms;
    correlation_coefficient /= y_norm;

    if force_finite {
        for val in correlation_coefficient.iter_mut() {
            if !val.is_finite() {
                *val = 0.0;
            }
        }
    }

    correlation_coefficient
}

/// Univariate linear regression tests returning F-statistic and p-values.
///
/// # Returns
///
/// A tuple of (F-statistic, p-value) arrays, each of shape (n_features,).
pub fn f_regression(x: &Array2<f64>, y: &Array1<f64>, center: bool, force_finite: bool) -> (Array1<f64>, Array1<f64>) {
    let correlation_coefficient = r_regression(x, y, center, force_finite);
    let deg_of_freedom = y.len() as f64 - if center { 2.0 } else { 1.0 };

    let corr_coef_squared = correlation_coefficient.mapv(|r| r.powi(2));
    let mut f_statistic = &corr_coef_squared / &corr_coef_squared.mapv(|r2| 1.0 - r2) * deg_of_freedom;
    let mut p_values = f_upper_tail(&f_statistic, 1.0, deg_of_freedom);

    if force_finite {
        for i in 0..f_statistic.len() {
            if f_statistic[i].is_infinite() {
                f_statistic[i] = f64::MAX;
                p_values[i] = 0.0;
            } else if f_statistic[i].is_nan() {
                f_statistic[i] = 0.0;
                p_values[i] = 1.0;
            }
        }
    }

    (f_statistic, p_values)
}

/// One-way ANOVA F-test of every column against the class labels.
///
/// Constant columns (zero within- and between-class variance) yield NaN,
/// the same as scikit-learn's `f_classif`.
pub fn f_classif(x: &Array2<f64>, y: &[usize]) -> (Array1<f64>, Array1<f64>) {
    let n_samples = x.nrows();
    let n_classes = y.iter().copied().max().map_or(0, |m| m + 1);

    let mut counts = vec![0usize; n_classes];
    for &label in y {
        counts[label] += 1;
    }
    let present = counts.iter().filter(|&&c| c > 0).count();
    let df_between = present as f64 - 1.0;
    let df_within = n_samples as f64 - present as f64;

    let mut f_statistic = Array1::from_elem(x.ncols(), f64::NAN);
    if df_between > 0.0 && df_within > 0.0 {
        for (j, col) in x.columns().into_iter().enumerate() {
            let grand_mean = col.sum() / n_samples as f64;
            let mut class_sums = vec![0.0; n_classes];
            for (&value, &label) in col.iter().zip(y) {
                class_sums[label] += value;
            }

            let mut ss_between = 0.0;
            for (sum, &count) in class_sums.iter().zip(&counts) {
                if count > 0 {
                    let class_mean = sum / count as f64;
                    ss_between += count as f64 * (class_mean - grand_mean).powi(2);
                }
            }
            let mut ss_within = 0.0;
            for (&value, &label) in col.iter().zip(y) {
                let class_mean = class_sums[label] / counts[label] as f64;
                ss_within += (value - class_mean).powi(2);
            }

            f_statistic[j] = (ss_between / df_between) / (ss_within / df_within);
        }
    }

    let p_values = f_upper_tail(&f_statistic, df_between, df_within);
    (f_statistic, p_values)
}

fn f_upper_tail(f_statistic: &Array1<f64>, df1: f64, df2: f64) -> Array1<f64> {
    match FisherSnedecor::new(df1, df2) {
        Ok(dist) => f_statistic.mapv(|f| if f.is_finite() { 1.0 - dist.cdf(f) } else { f64::NAN }),
        Err(_) => Array1::from_elem(f_statistic.len(), f64::NAN),
    }
}

/// A per-column scoring criterion. Higher scores mean stronger predictors.
pub trait ScoreFunction {
    fn score(&self, x: &Array2<f64>, y: &[usize]) -> Array1<f64>;
}

/// Built-in criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCriterion {
    /// ANOVA F-value between label and feature (scikit-learn's default).
    #[default]
    FClassif,
    /// F-value of a univariate linear regression against the class index.
    FRegression,
}

impl ScoreFunction for ScoreCriterion {
    fn score(&self, x: &Array2<f64>, y: &[usize]) -> Array1<f64> {
        match self {
            ScoreCriterion::FClassif => f_classif(x, y).0,
            ScoreCriterion::FRegression => {
                let target = y.iter().map(|&v| v as f64).collect::<Array1<f64>>();
                f_regression(x, &target, true, true).0
            }
        }
    }
}

impl<F> ScoreFunction for F
where
    F: Fn(&Array2<f64>, &[usize]) -> Array1<f64>,
{
    fn score(&self, x: &Array2<f64>, y: &[usize]) -> Array1<f64> {
        self(x, y)
    }
}

/// Column indices ordered from strongest to weakest.
///
/// Ties go to the lower column index so repeated runs on the same data always
/// eliminate the same columns. Non-finite scores rank last.
pub fn rank_columns(scores: &Array1<f64>) -> Vec<usize> {
    let key = |i: usize| {
        let s = scores[i];
        if s.is_nan() {
            f64::NEG_INFINITY
        } else {
            s
        }
    };
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| match key(b).total_cmp(&key(a)) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });
    indices
}

/// Removes the `k` best-scoring features and keeps the rest.
///
/// The complement of scikit-learn's `SelectKBest`: after fitting, the support
/// holds `n_features - min(k, n_features)` columns in their original order.
#[derive(Debug, Clone)]
pub struct SelectNotKBest<S = ScoreCriterion> {
    k: usize,
    score_fn: S,
    scores: Option<Array1<f64>>,
    support: Option<Vec<usize>>,
    n_features: usize,
}

impl SelectNotKBest<ScoreCriterion> {
    /// Creates a selector using the ANOVA F criterion.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when `k` is negative.
    pub fn new(k: i64) -> Result<Self> {
        Self::with_score_fn(k, ScoreCriterion::default())
    }
}

impl<S: ScoreFunction> SelectNotKBest<S> {
    pub fn with_score_fn(k: i64, score_fn: S) -> Result<Self> {
        if k < 0 {
            return Err(EliminationError::InvalidParameter(format!(
                "number of eliminated features must be non-negative, got {}",
                k
            )));
        }
        Ok(SelectNotKBest {
            k: k as usize,
            score_fn,
            scores: None,
            support: None,
            n_features: 0,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Scores every column and records which ones survive elimination.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(EliminationError::ShapeMismatch(format!(
                "{} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let scores = self.score_fn.score(x, y);
        if scores.len() != x.ncols() {
            return Err(EliminationError::ShapeMismatch(format!(
                "score function returned {} scores for {} columns",
                scores.len(),
                x.ncols()
            )));
        }

        let ranking = rank_columns(&scores);
        let eliminated = self.k.min(ranking.len());
        let mut support = ranking[eliminated..].to_vec();
        support.sort_unstable();

        log::debug!(
            "SelectNotKBest: eliminated {} of {} columns: {:?}",
            eliminated,
            ranking.len(),
            &ranking[..eliminated]
        );

        self.n_features = x.ncols();
        self.scores = Some(scores);
        self.support = Some(support);
        Ok(self)
    }

    /// Retained column indices, ascending. Empty before `fit`.
    pub fn support(&self) -> &[usize] {
        self.support.as_deref().unwrap_or(&[])
    }

    pub fn scores(&self) -> Option<&Array1<f64>> {
        self.scores.as_ref()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let support = self
            .support
            .as_ref()
            .ok_or_else(|| EliminationError::InvalidParameter("selector not fitted".to_string()))?;
        if x.ncols() != self.n_features {
            return Err(EliminationError::ShapeMismatch(format!(
                "selector fitted on {} columns, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(x.select(Axis(1), support))
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<Array2<f64>> {
        self.fit(x, y)?;
        self.transform(x)
    }
}

/// One-shot selection: the retained column indices after removing the `k`
/// best columns of `x` under `score_fn`.
pub fn select_not_k_best<S: ScoreFunction>(x: &Array2<f64>, y: &[usize], k: i64, score_fn: S) -> Result<Vec<usize>> {
    let mut selector = SelectNotKBest::with_score_fn(k, score_fn)?;
    selector.fit(x, y)?;
    Ok(selector.support().to_vec())
}
