use ndarray::Array2;

use crate::error::Result;

/// The fit/predict contract sweep pipelines rely on. Labels are dense class
/// indices as produced by `LabelEncoder`.
pub trait Classifier: Send {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()>;

    /// Predicted class index per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
