//! File formats: the labelled sample table and the named dataset store.
pub mod samples;
pub mod store;

pub use samples::{read_samples_tsv, read_samples_tsv_with_config, SampleReaderConfig};
pub use store::{dataset_name, DatasetStore};
