use ndarray::{Array1, Array2, Axis};

use crate::error::{EliminationError, Result};
use crate::models::classifier_trait::Classifier;

/// Assigns each row to the class with the closest (Euclidean) mean.
#[derive(Debug, Clone, Default)]
pub struct NearestCentroid {
    centroids: Vec<(usize, Array1<f64>)>,
}

impl Classifier for NearestCentroid {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(EliminationError::ShapeMismatch(format!(
                "{} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        self.centroids = classes
            .into_iter()
            .filter_map(|class| {
                let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
                x.select(Axis(0), &rows)
                    .mean_axis(Axis(0))
                    .map(|centroid| (class, centroid))
            })
            .collect();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        if self.centroids.is_empty() {
            return Err(EliminationError::InvalidParameter(
                "nearest centroid used before fit".to_string(),
            ));
        }
        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = (self.centroids[0].0, f64::INFINITY);
                for (class, centroid) in &self.centroids {
                    let dist = (&row - centroid).mapv(|d| d * d).sum();
                    if dist < best.1 {
                        best = (*class, dist);
                    }
                }
                best.0
            })
            .collect())
    }

    fn name(&self) -> &str {
        "nearest_centroid"
    }
}
