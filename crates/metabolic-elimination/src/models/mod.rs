pub mod centroid;
pub mod gbdt;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::Classifier;
pub use factory::build_model;
