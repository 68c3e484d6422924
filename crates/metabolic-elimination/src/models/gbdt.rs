use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;

use crate::config::{ModelConfig, ModelType};
use crate::error::{EliminationError, Result};
use crate::models::classifier_trait::Classifier;

enum Fitted {
    Boosted(GBDT),
    /// Training fold held a single class.
    Constant(usize),
}

/// Gradient Boosting Decision Tree (GBDT) binary classifier
pub struct GBDTClassifier {
    model: Option<Fitted>,
    params: ModelConfig,
}

impl GBDTClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GBDTClassifier {
            model: None,
            params,
        }
    }
}

fn to_data_vec(x: &Array2<f64>, y: Option<&[usize]>) -> DataVec {
    let mut data = DataVec::new();
    for (i, row) in x.rows().into_iter().enumerate() {
        let features = row.iter().map(|&v| v as f32).collect::<Vec<f32>>();
        // LogLikelyhood loss expects labels in {-1, 1}
        let label = match y {
            Some(y) if y[i] == 1 => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        };
        data.push(Data::new_training_data(features, 1.0, label, None));
    }
    data
}

impl Classifier for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(EliminationError::ShapeMismatch(format!(
                "{} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if let Some(&label) = y.iter().find(|&&label| label > 1) {
            return Err(EliminationError::InvalidParameter(format!(
                "GBDT classifier is binary, got class index {}",
                label
            )));
        }
        if y.iter().all(|&label| label == y[0]) {
            self.model = Some(Fitted::Constant(y.first().copied().unwrap_or(0)));
            return Ok(());
        }

        match &self.params.model_type {
            ModelType::GBDT {
                max_depth,
                num_boost_round,
                debug,
                loss_type,
            } => {
                let mut config = Config::new();

                config.set_feature_size(x.ncols());
                config.set_shrinkage(self.params.learning_rate);
                config.set_max_depth(*max_depth);
                config.set_iterations(*num_boost_round as usize);
                config.set_debug(*debug);
                config.set_loss(loss_type);

                let mut gbdt = GBDT::new(&config);
                let mut train_x = to_data_vec(x, Some(y));
                gbdt.fit(&mut train_x);

                self.model = Some(Fitted::Boosted(gbdt));
                Ok(())
            }
            other => Err(EliminationError::InvalidParameter(format!(
                "Expected ModelType::GBDT params, got {:?}",
                other
            ))),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        match &self.model {
            Some(Fitted::Boosted(gbdt)) => {
                let test_x = to_data_vec(x, None);
                Ok(gbdt
                    .predict(&test_x)
                    .into_iter()
                    .map(|p| if p >= 0.5 { 1 } else { 0 })
                    .collect())
            }
            Some(Fitted::Constant(label)) => Ok(vec![*label; x.nrows()]),
            None => Err(EliminationError::InvalidParameter(
                "GBDT classifier used before fit".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "gbdt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gbdt_classifier_separates_two_classes() {
        let x = array![
            [0.1, 1.0],
            [0.4, -1.0],
            [0.6, 1.0],
            [0.9, -1.0],
            [1.2, 1.0],
            [1.5, -1.0],
            [1.8, 1.0],
            [2.1, -1.0],
        ];
        let y = vec![1, 0, 1, 0, 1, 0, 1, 0];

        let params = ModelConfig {
            learning_rate: 0.1,
            model_type: ModelType::GBDT {
                max_depth: 3,
                num_boost_round: 20,
                debug: false,
                loss_type: "LogLikelyhood".to_string(),
            },
        };

        let mut classifier = GBDTClassifier::new(params);
        classifier.fit(&x, &y).unwrap();
        let predictions = classifier.predict(&x).unwrap();
        assert_eq!(predictions.len(), y.len());
        let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 6, "predictions: {:?}", predictions);
    }

    #[test]
    fn test_gbdt_rejects_multiclass_and_unfitted_use() {
        let x = array![[0.0], [1.0], [2.0]];
        let mut classifier = GBDTClassifier::new(ModelConfig::default());
        assert!(classifier.predict(&x).is_err());
        assert!(classifier.fit(&x, &[0, 1, 2]).is_err());
    }

    #[test]
    fn test_gbdt_single_class_fold_predicts_constant() {
        let x = array![[0.0], [1.0]];
        let mut classifier = GBDTClassifier::new(ModelConfig::default());
        classifier.fit(&x, &[1, 1]).unwrap();
        assert_eq!(classifier.predict(&array![[5.0]]).unwrap(), vec![1]);
    }
}
