//! Merges per-pathway PARADIGM results into one dataset per elimination level.
//!
//! The merge is positional: block `j` of every pathway is assumed to describe
//! sample `j`. All pathway runs of a level read the same evidence file, which
//! is what makes this hold; nothing here can detect a reordering upstream.
use crate::dataset::{Dataset, FeatureRecord};
use crate::error::{EliminationError, Result};
use crate::io::store::{dataset_name, DatasetStore};
use crate::network::PathwayModel;
use crate::paradigm::driver::{InferenceDriver, PathwayRun, RunState, SampleBlocks, ToolInvoker};

/// Record `j` is the union of every pathway's block `j`. When two pathways
/// report the same node the later pathway wins.
pub fn merge_observations<'a, T>(per_pathway: T) -> Vec<FeatureRecord>
where
    T: IntoIterator<Item = &'a SampleBlocks>,
{
    let mut merged: Vec<FeatureRecord> = Vec::new();
    for blocks in per_pathway {
        for (j, block) in blocks.iter().enumerate() {
            if merged.len() <= j {
                merged.resize_with(j + 1, FeatureRecord::new);
            }
            merged[j].extend(block.iter().cloned());
        }
    }
    merged
}

pub struct ResultAggregator<'a, I: ToolInvoker> {
    driver: &'a InferenceDriver<I>,
    store: &'a DatasetStore,
    result_name: String,
    gz: bool,
}

impl<'a, I: ToolInvoker> ResultAggregator<'a, I> {
    pub fn new(driver: &'a InferenceDriver<I>, store: &'a DatasetStore, result_name: &str, gz: bool) -> Self {
        ResultAggregator {
            driver,
            store,
            result_name: result_name.to_string(),
            gz,
        }
    }

    pub fn name_for(&self, k: usize) -> String {
        dataset_name(&self.result_name, k)
    }

    /// Dataset for level `k`, reusing a stored one when present.
    pub fn aggregate_level(&self, model: &PathwayModel, k: usize, labels: &[String]) -> Result<Dataset> {
        let name = self.name_for(k);
        if self.store.exists(&name, self.gz) {
            log::info!("Reusing stored PARADIGM results '{}'", name);
            return self.store.read(&name, self.gz);
        }

        log::info!("Running PARADIGM for k={}", k);
        let runs = self.driver.run_level(model, k)?;
        log_run_summary(k, &runs);

        let records = merge_observations(
            runs.iter()
                .filter(|run| run.state == RunState::Parsed)
                .map(|run| &run.blocks),
        );
        if records.len() != labels.len() {
            return Err(EliminationError::ShapeMismatch(format!(
                "PARADIGM produced {} samples for k={} but {} labels were given",
                records.len(),
                k,
                labels.len()
            )));
        }

        let dataset = Dataset::new(records, labels.to_vec())?;
        self.store.write(&name, &dataset, self.gz)?;
        Ok(dataset)
    }

    /// Runs `levels` in order and returns the stored dataset names.
    pub fn aggregate_levels<L>(&self, model: &PathwayModel, levels: L, labels: &[String]) -> Result<Vec<String>>
    where
        L: IntoIterator<Item = usize>,
    {
        let mut names = Vec::new();
        for k in levels {
            self.aggregate_level(model, k, labels)?;
            names.push(self.name_for(k));
        }
        Ok(names)
    }
}

fn log_run_summary(k: usize, runs: &[PathwayRun]) {
    let count = |state: RunState| runs.iter().filter(|run| run.state == state).count();
    log::info!(
        "k={}: {} pathways parsed, {} failed, {} skipped",
        k,
        count(RunState::Parsed),
        count(RunState::Failed),
        count(RunState::NotRun)
    );
}
