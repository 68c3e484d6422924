//! Record-to-prediction pipelines: vectorize, run the preprocessing steps in
//! order, then classify.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::dataset::FeatureRecord;
use crate::error::Result;
use crate::models::{build_model, Classifier};
use crate::preprocessing::{Step, StepKind, Transform};
use crate::vectorizer::DictVectorizer;

/// Declarative description of a pipeline; instantiated once per elimination level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub steps: Vec<StepKind>,
    pub model: ModelConfig,
}

impl PipelineSpec {
    pub fn new(steps: Vec<StepKind>, model: ModelConfig) -> Self {
        PipelineSpec { steps, model }
    }

    /// Fresh, unfitted pipeline with elimination steps bound to `k`.
    pub fn build(&self, k: usize) -> Result<Pipeline> {
        let steps = self
            .steps
            .iter()
            .map(|&kind| Step::build(kind, k))
            .collect::<Result<Vec<_>>>()?;
        Ok(Pipeline {
            vectorizer: DictVectorizer::new(),
            steps,
            model: build_model(&self.model),
        })
    }
}

pub struct Pipeline {
    vectorizer: DictVectorizer,
    steps: Vec<Step>,
    model: Box<dyn Classifier>,
}

impl Pipeline {
    pub fn fit(&mut self, records: &[FeatureRecord], y: &[usize]) -> Result<()> {
        let mut x = self.vectorizer.fit_transform(records);
        for step in self.steps.iter_mut() {
            x = step.fit_transform(&x, y)?;
        }
        self.model.fit(&x, y)
    }

    pub fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<usize>> {
        let x = self.transform(records)?;
        self.model.predict(&x)
    }

    /// Matrix handed to the classifier for `records`.
    pub fn transform(&self, records: &[FeatureRecord]) -> Result<Array2<f64>> {
        let mut x = self.vectorizer.transform(records);
        for step in &self.steps {
            x = step.transform(&x)?;
        }
        Ok(x)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}
