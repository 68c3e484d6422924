//! Named persistence of datasets, optionally gzip-compressed.
//!
//! Aggregated PARADIGM results are written once per elimination level and
//! read back by the evaluation sweep; a missing name is reported as
//! `DatasetNotFound` so callers can tell "not produced yet" apart from I/O
//! failures.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::dataset::Dataset;
use crate::error::{EliminationError, Result};

/// `{id}#k={k}`, the name of a dataset produced for elimination level `k`.
pub fn dataset_name(id: &str, k: usize) -> String {
    format!("{}#k={}", id, k)
}

#[derive(Debug, Clone)]
pub struct DatasetStore {
    root: PathBuf,
}

impl DatasetStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DatasetStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str, gz: bool) -> PathBuf {
        let file = if gz {
            format!("{}.json.gz", name)
        } else {
            format!("{}.json", name)
        };
        self.root.join(file)
    }

    pub fn exists(&self, name: &str, gz: bool) -> bool {
        self.path_for(name, gz).is_file()
    }

    /// Writes `dataset` under `name`, creating the store directory if needed.
    pub fn write(&self, name: &str, dataset: &Dataset, gz: bool) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(name, gz);
        if path.exists() {
            log::warn!("Replacing stored dataset {}", path.display());
        }

        let file = BufWriter::new(File::create(&path)?);
        if gz {
            let mut encoder = GzEncoder::new(file, Compression::default());
            serde_json::to_writer(&mut encoder, dataset)?;
            encoder.finish()?.flush()?;
        } else {
            let mut file = file;
            serde_json::to_writer(&mut file, dataset)?;
            file.flush()?;
        }

        log::info!("Stored dataset '{}' ({} samples) at {}", name, dataset.len(), path.display());
        Ok(path)
    }

    /// Loads the dataset stored under exactly `name`.
    pub fn read(&self, name: &str, gz: bool) -> Result<Dataset> {
        let path = self.path_for(name, gz);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(EliminationError::DatasetNotFound(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let stored: Dataset = if gz {
            serde_json::from_reader(BufReader::new(GzDecoder::new(file)))?
        } else {
            serde_json::from_reader(BufReader::new(file))?
        };
        // Re-check the record/label invariant on data coming from disk
        let (records, labels) = stored.into_parts();
        Dataset::new(records, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureRecord;

    fn sample() -> Dataset {
        let record: FeatureRecord = [("R1".to_string(), 0.0), ("R2".to_string(), -1.5)].into_iter().collect();
        Dataset::new(vec![record.clone(), record], vec!["bc".into(), "h".into()]).unwrap()
    }

    #[test]
    fn names_embed_the_elimination_level() {
        assert_eq!(dataset_name("paradigm_results", 20), "paradigm_results#k=20");
    }

    #[test]
    fn round_trips_plain_and_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path().join("nested"));
        let ds = sample();

        for gz in [false, true] {
            let path = store.write("bc#k=0", &ds, gz).unwrap();
            assert!(path.to_string_lossy().ends_with(if gz { ".json.gz" } else { ".json" }));
            assert!(store.exists("bc#k=0", gz));
            assert_eq!(store.read("bc#k=0", gz).unwrap(), ds);
        }
    }

    #[test]
    fn missing_name_is_dataset_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());
        match store.read("bc#k=20", true) {
            Err(EliminationError::DatasetNotFound(name)) => assert_eq!(name, "bc#k=20"),
            other => panic!("expected DatasetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn mismatched_stored_dataset_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());
        std::fs::write(store.path_for("bad", false), r#"{"records": [{}], "labels": []}"#).unwrap();
        assert!(matches!(store.read("bad", false), Err(EliminationError::ShapeMismatch(_))));
    }
}
