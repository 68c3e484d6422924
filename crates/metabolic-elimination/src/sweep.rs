//! Evaluation sweep over elimination levels.
//!
//! For each level `k` every data source is loaded (cached sources by the name
//! `{dataset}#k={k}`), run through its pipeline with stratified
//! cross-validation, and the mean score is recorded. A cached dataset that
//! has not been produced yet ends the sweep normally with the rows gathered
//! so far.
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};

use crate::config::SweepConfig;
use crate::dataset::Dataset;
use crate::error::EliminationError;
use crate::io::store::{dataset_name, DatasetStore};
use crate::pipeline::PipelineSpec;
use crate::validation::{cross_val_score, mean, StratifiedKFold};

/// Elimination levels `start, start + step, ...` below `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliminationSchedule {
    start: usize,
    stop: usize,
    step: usize,
}

impl EliminationSchedule {
    pub fn new(start: usize, stop: usize, step: usize) -> Result<Self, EliminationError> {
        if step == 0 {
            return Err(EliminationError::InvalidParameter(
                "elimination step must be positive".to_string(),
            ));
        }
        Ok(EliminationSchedule { start, stop, step })
    }

    pub fn levels(&self) -> impl Iterator<Item = usize> {
        (self.start..self.stop).step_by(self.step)
    }
}

#[derive(Debug, Clone)]
pub enum DataOrigin {
    /// The same dataset at every level; elimination happens in the pipeline.
    Static(Dataset),
    /// A per-level dataset produced by an earlier stage.
    Cached { dataset: String, gz: bool },
}

#[derive(Debug, Clone)]
pub struct DataSource {
    pub name: String,
    pub origin: DataOrigin,
    pub pipeline: PipelineSpec,
}

impl DataSource {
    pub fn new(name: &str, origin: DataOrigin, pipeline: PipelineSpec) -> Self {
        DataSource {
            name: name.to_string(),
            origin,
            pipeline,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub k: usize,
    /// Mean cross-validated score per source name.
    pub scores: BTreeMap<String, f64>,
}

/// Scores ordered by ascending elimination level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepTable {
    rows: Vec<SweepRow>,
}

impl SweepTable {
    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    pub fn levels(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.k).collect()
    }

    pub fn score(&self, k: usize, source: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.k == k)
            .and_then(|row| row.scores.get(source).copied())
    }

    fn push(&mut self, row: SweepRow) {
        self.rows.push(row);
    }
}

impl fmt::Display for SweepTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&String> = match self.rows.first() {
            Some(row) => row.scores.keys().collect(),
            None => return write!(f, "(no completed iterations)"),
        };
        write!(f, "iteration")?;
        for name in &names {
            write!(f, "\t{}", name)?;
        }
        for row in &self.rows {
            write!(f, "\n{}", row.k)?;
            for name in &names {
                match row.scores.get(*name) {
                    Some(score) => write!(f, "\t{:.4}", score)?,
                    None => write!(f, "\t-")?,
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub table: SweepTable,
    /// Level whose cached dataset was missing, if the sweep stopped early.
    pub stopped_at: Option<usize>,
}

pub struct SweepHarness {
    schedule: EliminationSchedule,
    cv: StratifiedKFold,
    store: DatasetStore,
    sources: Vec<DataSource>,
}

impl SweepHarness {
    pub fn new(config: &SweepConfig, store: DatasetStore) -> Result<Self, EliminationError> {
        Ok(SweepHarness {
            schedule: EliminationSchedule::new(config.start, config.stop, config.step)?,
            cv: StratifiedKFold::new(config.n_splits, config.shuffle_seed)?,
            store,
            sources: Vec::new(),
        })
    }

    pub fn with_source(mut self, source: DataSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn run(&self) -> Result<SweepOutcome> {
        let mut table = SweepTable::default();

        for k in self.schedule.levels() {
            let mut datasets: Vec<Cow<'_, Dataset>> = Vec::with_capacity(self.sources.len());
            for source in &self.sources {
                match self.load(source, k) {
                    Ok(dataset) => datasets.push(dataset),
                    Err(EliminationError::DatasetNotFound(name)) => {
                        log::info!("Dataset '{}' not found; stopping sweep at k={}", name, k);
                        log::info!("Sweep results:\n{}", table);
                        return Ok(SweepOutcome {
                            table,
                            stopped_at: Some(k),
                        });
                    }
                    Err(err) => {
                        return Err(err).with_context(|| format!("Failed to load source '{}' for k={}", source.name, k))
                    }
                }
            }

            let mut scores = BTreeMap::new();
            for (source, dataset) in self.sources.iter().zip(&datasets) {
                let fold_scores = cross_val_score(&source.pipeline, dataset, k, &self.cv)
                    .with_context(|| format!("Failed to score source '{}' at k={}", source.name, k))?;
                log::debug!("k={} {}: fold scores {:?}", k, source.name, fold_scores);
                scores.insert(source.name.clone(), mean(&fold_scores));
            }
            table.push(SweepRow { k, scores });
            log::info!("Sweep results:\n{}", table);
        }

        Ok(SweepOutcome {
            table,
            stopped_at: None,
        })
    }

    fn load<'s>(&'s self, source: &'s DataSource, k: usize) -> Result<Cow<'s, Dataset>, EliminationError> {
        match &source.origin {
            DataOrigin::Static(dataset) => Ok(Cow::Borrowed(dataset)),
            DataOrigin::Cached { dataset, gz } => self.store.read(&dataset_name(dataset, k), *gz).map(Cow::Owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_half_open_and_validated() {
        let levels: Vec<usize> = EliminationSchedule::new(0, 30, 10).unwrap().levels().collect();
        assert_eq!(levels, vec![0, 10, 20]);
        assert!(EliminationSchedule::new(0, 30, 0).is_err());
    }

    #[test]
    fn table_renders_one_line_per_level() {
        let mut table = SweepTable::default();
        assert_eq!(table.to_string(), "(no completed iterations)");
        for k in [0, 10] {
            let scores = [("metabolite".to_string(), 0.5), ("paradigm".to_string(), 1.0)]
                .into_iter()
                .collect();
            table.push(SweepRow { k, scores });
        }
        assert_eq!(
            table.to_string(),
            "iteration\tmetabolite\tparadigm\n0\t0.5000\t1.0000\n10\t0.5000\t1.0000"
        );
        assert_eq!(table.score(10, "paradigm"), Some(1.0));
        assert_eq!(table.levels(), vec![0, 10]);
    }

    #[test]
    fn corrupt_stored_level_is_an_error_not_a_stop() {
        use crate::config::{ModelConfig, ModelType};

        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());
        std::fs::write(store.path_for("paradigm_results#k=0", false), "{\"records\": [").unwrap();

        let config = SweepConfig {
            start: 0,
            stop: 20,
            step: 10,
            n_splits: 2,
            shuffle_seed: None,
        };
        let harness = SweepHarness::new(&config, store).unwrap().with_source(DataSource::new(
            "paradigm",
            DataOrigin::Cached {
                dataset: "paradigm_results".to_string(),
                gz: false,
            },
            PipelineSpec::new(vec![], ModelConfig::new(0.1, ModelType::NearestCentroid {})),
        ));

        let err = harness.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EliminationError>(),
            Some(EliminationError::Json(_))
        ));
        assert!(err.to_string().contains("paradigm"));
    }
}
