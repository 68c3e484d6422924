//! Matrix preprocessing steps applied between vectorization and the classifier.
//!
//! Steps form a closed set (`StepKind`) so that pipelines are described by
//! data rather than by free-form names. Each fitted step implements
//! `Transform`.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{EliminationError, Result};
use crate::feature_selection::{ScoreCriterion, SelectNotKBest};

/// Fit on training rows, then apply the same mapping to any rows.
pub trait Transform {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()>;

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    fn fit_transform(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<Array2<f64>> {
        self.fit(x, y)?;
        self.transform(x)
    }
}

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, Default)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;
}

impl Transform for Scaler {
    fn fit(&mut self, x: &Array2<f64>, _y: &[usize]) -> Result<()> {
        if x.nrows() == 0 {
            return Err(EliminationError::ShapeMismatch(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }
        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
        let std = x.std_axis(Axis(0), 0.0).mapv(|s| s.max(Self::MIN_STD));
        self.mean = mean;
        self.std = std;
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        check_width("scaler", self.mean.len(), x)?;
        Ok((x - &self.mean) / &self.std)
    }
}

/// Rescales every column to [0, 1] using the training min and max.
#[derive(Clone, Debug, Default)]
pub struct MinMaxScaler {
    pub min: Array1<f64>,
    pub range: Array1<f64>,
}

impl Transform for MinMaxScaler {
    fn fit(&mut self, x: &Array2<f64>, _y: &[usize]) -> Result<()> {
        if x.nrows() == 0 {
            return Err(EliminationError::ShapeMismatch(
                "cannot fit a min-max scaler on zero rows".to_string(),
            ));
        }
        let min = x.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
        let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
        // Constant columns map to 0
        self.range = (&max - &min).mapv(|r| if r > 0.0 { r } else { 1.0 });
        self.min = min;
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        check_width("min-max scaler", self.min.len(), x)?;
        Ok((x - &self.min) / &self.range)
    }
}

impl Transform for SelectNotKBest<ScoreCriterion> {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        SelectNotKBest::fit(self, x, y).map(|_| ())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        SelectNotKBest::transform(self, x)
    }
}

fn check_width(step: &str, fitted: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != fitted {
        return Err(EliminationError::ShapeMismatch(format!(
            "{} fitted on {} columns, got {}",
            step,
            fitted,
            x.ncols()
        )));
    }
    Ok(())
}

/// Named preprocessing steps available to pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    StandardScaler,
    MinMaxScaler,
    /// Drop the best features; the count is the sweep's current elimination level.
    EliminateBest { criterion: ScoreCriterion },
}

/// An unfitted step built from a `StepKind` for one elimination level.
#[derive(Debug, Clone)]
pub enum Step {
    Standard(Scaler),
    MinMax(MinMaxScaler),
    Eliminate(SelectNotKBest<ScoreCriterion>),
}

impl Step {
    pub fn build(kind: StepKind, k: usize) -> Result<Self> {
        Ok(match kind {
            StepKind::StandardScaler => Step::Standard(Scaler::default()),
            StepKind::MinMaxScaler => Step::MinMax(MinMaxScaler::default()),
            StepKind::EliminateBest { criterion } => {
                Step::Eliminate(SelectNotKBest::with_score_fn(k as i64, criterion)?)
            }
        })
    }

    fn as_transform(&mut self) -> &mut dyn Transform {
        match self {
            Step::Standard(s) => s,
            Step::MinMax(s) => s,
            Step::Eliminate(s) => s,
        }
    }
}

impl Transform for Step {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        self.as_transform().fit(x, y)
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            Step::Standard(s) => s.transform(x),
            Step::MinMax(s) => s.transform(x),
            Step::Eliminate(s) => Transform::transform(s, x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn scaler_centers_columns() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let mut sc = Scaler::default();
        let t = sc.fit_transform(&x, &[]).unwrap();
        assert!((sc.mean[0] - 2.5).abs() < 1e-12);
        assert!(t.column(1).sum().abs() < 1e-9);
    }

    #[test]
    fn min_max_maps_to_unit_interval_and_handles_constants() {
        let x = array![[1.0, 3.0], [3.0, 3.0], [2.0, 3.0]];
        let mut mm = MinMaxScaler::default();
        let t = mm.fit_transform(&x, &[]).unwrap();
        assert_eq!(t.column(0).to_vec(), vec![0.0, 1.0, 0.5]);
        assert_eq!(t.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn step_binds_elimination_level() {
        let x = array![[1.0, 0.0], [1.1, 0.1], [-1.0, 0.0], [-1.1, 0.1]];
        let y = vec![1, 1, 0, 0];
        let mut step = Step::build(
            StepKind::EliminateBest { criterion: ScoreCriterion::FClassif },
            1,
        )
        .unwrap();
        let t = step.fit_transform(&x, &y).unwrap();
        assert_eq!(t.column(0).to_vec(), vec![0.0, 0.1, 0.0, 0.1]);
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let mut sc = Scaler::default();
        sc.fit(&array![[1.0, 2.0]], &[]).unwrap();
        assert!(sc.transform(&array![[1.0]]).is_err());
    }
}
