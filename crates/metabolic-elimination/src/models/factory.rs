use crate::config::{ModelConfig, ModelType};
use crate::models::centroid::NearestCentroid;
use crate::models::classifier_trait::Classifier;
use crate::models::gbdt::GBDTClassifier;

/// Build a boxed classifier model from a `ModelConfig`.
pub fn build_model(params: &ModelConfig) -> Box<dyn Classifier> {
    match params.model_type {
        ModelType::GBDT { .. } => Box::new(GBDTClassifier::new(params.clone())),
        ModelType::NearestCentroid {} => Box::new(NearestCentroid::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_picks_the_configured_model() {
        let gbdt = build_model(&ModelConfig::default());
        assert_eq!(gbdt.name(), "gbdt");
        let centroid = build_model(&ModelConfig::new(0.1, ModelType::NearestCentroid {}));
        assert_eq!(centroid.name(), "nearest_centroid");
    }
}
