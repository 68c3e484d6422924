//! One elimination round over named-feature records.
//!
//! Vectorize the samples, drop the `k` best-scoring columns and map the
//! surviving columns back to named records. The reduced dataset feeds either
//! further preprocessing, the dataset store or the PARADIGM evidence files.
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::dataset::{Dataset, FeatureRecord, LabelEncoder};
use crate::error::Result;
use crate::feature_selection::{ScoreFunction, SelectNotKBest};
use crate::io::store::{dataset_name, DatasetStore};
use crate::paradigm::files::write_evidence_file;
use crate::preprocessing::{Scaler, Transform};
use crate::vectorizer::{inverse_transform, DictVectorizer, InverseDictVectorizer};

/// `dataset` with its `k` most discriminative features removed from every record.
pub fn eliminate_best_k<S: ScoreFunction>(dataset: &Dataset, k: i64, score_fn: S) -> Result<Dataset> {
    let y = LabelEncoder::fit(dataset.labels()).transform(dataset.labels())?;

    let mut vect = DictVectorizer::new();
    let x = vect.fit_transform(dataset.records());

    let mut selector = SelectNotKBest::with_score_fn(k, score_fn)?;
    let selected = selector.fit_transform(&x, &y)?;

    if log::log_enabled!(log::Level::Debug) {
        if let Some(scores) = selector.scores() {
            let eliminated: Vec<String> = (0..vect.vocabulary().len())
                .filter(|i| selector.support().binary_search(i).is_err())
                .map(|i| format!("{}={:.3}", vect.vocabulary()[i], scores[i]))
                .collect();
            log::debug!(
                "k={}: kept {} of {} features, eliminated [{}]",
                k,
                selector.support().len(),
                vect.vocabulary().len(),
                eliminated.join(", ")
            );
        }
    }

    let records = InverseDictVectorizer::new(&vect, &selector).transform(&selected)?;
    Dataset::new(records, dataset.labels().to_vec())
}

/// Standardizes every feature to zero mean and unit variance across samples.
///
/// Absent features count as zero when computing the column statistics and
/// stay absent in the result.
pub fn standardize(dataset: &Dataset) -> Result<Dataset> {
    let mut vect = DictVectorizer::new();
    let x = vect.fit_transform(dataset.records());

    let mut scaler = Scaler::default();
    let scaled = scaler.fit_transform(&x, &[])?;

    let all: Vec<usize> = (0..vect.vocabulary().len()).collect();
    let records = inverse_transform(&scaled, vect.vocabulary(), &all)?
        .into_iter()
        .zip(dataset.records())
        .map(|(scaled, original)| {
            scaled
                .into_iter()
                .filter(|(name, _)| original.contains_key(name))
                .collect::<FeatureRecord>()
        })
        .collect();
    Dataset::new(records, dataset.labels().to_vec())
}

/// Writes one PARADIGM evidence file per level. Samples are standardized
/// first so the evidence matches the discretization thresholds of the run
/// configuration; each level then has its best features removed.
pub fn write_evidence_levels<S, L>(
    dataset: &Dataset,
    levels: L,
    score_fn: S,
    dir: &Path,
    prefix: &str,
) -> anyhow::Result<Vec<PathBuf>>
where
    S: ScoreFunction + Clone,
    L: IntoIterator<Item = usize>,
{
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create evidence directory: {}", dir.display()))?;
    dataset.log_summary();
    let standardized = standardize(dataset).context("Failed to standardize samples")?;

    let mut written = Vec::new();
    for k in levels {
        let reduced = eliminate_best_k(&standardized, k as i64, score_fn.clone())
            .with_context(|| format!("Elimination failed for k={}", k))?;
        written.push(write_evidence_file(dir, prefix, k, reduced.records())?);
    }
    log::info!("Wrote {} evidence files to {}", written.len(), dir.display());
    Ok(written)
}

/// Stores the reduced dataset of every level as `{id}#k={k}`, ready to be
/// read back as a cached sweep source. Returns the stored names.
pub fn store_eliminated_levels<S, L>(
    dataset: &Dataset,
    levels: L,
    score_fn: S,
    store: &DatasetStore,
    id: &str,
    gz: bool,
) -> Result<Vec<String>>
where
    S: ScoreFunction + Clone,
    L: IntoIterator<Item = usize>,
{
    let mut names = Vec::new();
    for k in levels {
        let reduced = eliminate_best_k(dataset, k as i64, score_fn.clone())?;
        let name = dataset_name(id, k);
        store.write(&name, &reduced, gz)?;
        names.push(name);
    }
    log::info!("Stored {} eliminated datasets under '{}'", names.len(), id);
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureRecord;
    use crate::error::EliminationError;
    use crate::feature_selection::ScoreCriterion;

    fn dataset() -> Dataset {
        let rows = [
            [("R1", 1.0), ("R2", 0.3), ("R3", 0.0)],
            [("R1", 1.2), ("R2", 0.1), ("R3", 0.0)],
            [("R1", -1.0), ("R2", 0.2), ("R3", 0.0)],
            [("R1", -1.1), ("R2", 0.4), ("R3", 0.0)],
        ];
        let records = rows
            .iter()
            .map(|row| row.iter().map(|(k, v)| (k.to_string(), *v)).collect::<FeatureRecord>())
            .collect();
        Dataset::new(records, vec!["bc".into(), "bc".into(), "h".into(), "h".into()]).unwrap()
    }

    #[test]
    fn k_zero_round_trip_reproduces_records() {
        let ds = dataset();
        let out = eliminate_best_k(&ds, 0, ScoreCriterion::FClassif).unwrap();
        assert_eq!(out, ds);
    }

    #[test]
    fn removes_the_most_discriminative_feature() {
        let out = eliminate_best_k(&dataset(), 1, ScoreCriterion::FClassif).unwrap();
        for record in out.records() {
            assert!(!record.contains_key("R1"));
            assert_eq!(record["R3"], 0.0);
            assert_eq!(record.len(), 2);
        }
        assert_eq!(out.labels(), dataset().labels());
    }

    #[test]
    fn retained_count_plus_k_is_vocabulary_size() {
        for k in 0..=4 {
            let out = eliminate_best_k(&dataset(), k, ScoreCriterion::FClassif).unwrap();
            let retained = out.records()[0].len() as i64;
            assert_eq!(retained + k.min(3), 3);
        }
        assert!(matches!(
            eliminate_best_k(&dataset(), -2, ScoreCriterion::FClassif),
            Err(EliminationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn evidence_levels_drop_more_columns_as_k_grows() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_evidence_levels(&dataset(), [0, 1, 2], ScoreCriterion::FClassif, dir.path(), "BC").unwrap();
        assert_eq!(paths.len(), 3);

        let header = |i: usize| {
            let text = std::fs::read_to_string(&paths[i]).unwrap();
            text.lines().next().unwrap().to_string()
        };
        assert_eq!(header(0), "id\tR1\tR2\tR3");
        assert_eq!(header(1), "id\tR2\tR3");
        assert_eq!(header(2).split('\t').count(), 2);
        assert!(dir.path().join("BC_k=2_data.tsv").is_file());
    }

    fn column(path: &Path, name: &str) -> Vec<f64> {
        let text = std::fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        let idx = lines.next().unwrap().split('\t').position(|h| h == name).unwrap();
        lines
            .map(|line| line.split('\t').nth(idx).unwrap().parse::<f64>().unwrap())
            .collect()
    }

    #[test]
    fn evidence_values_are_standardized() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_evidence_levels(&dataset(), [0, 1], ScoreCriterion::FClassif, dir.path(), "BC").unwrap();

        for name in ["R1", "R2"] {
            let values = column(&paths[0], name);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            assert!(mean.abs() < 1e-9, "{} mean {}", name, mean);
            assert!((var - 1.0).abs() < 1e-9, "{} variance {}", name, var);
        }
        assert_eq!(column(&paths[0], "R3"), vec![0.0; 4]);
        // R2 = [0.3, 0.1, 0.2, 0.4] has mean 0.25 and std sqrt(0.0125)
        let r2 = column(&paths[1], "R2");
        assert!((r2[0] - 0.05 / 0.0125f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn standardize_keeps_absent_features_absent() {
        let records: Vec<FeatureRecord> = vec![
            [("a".to_string(), 1.0), ("b".to_string(), 2.0)].into_iter().collect(),
            [("a".to_string(), 3.0)].into_iter().collect(),
        ];
        let ds = Dataset::new(records, vec!["bc".into(), "h".into()]).unwrap();
        let out = standardize(&ds).unwrap();
        assert_eq!(out.records()[0]["a"], -1.0);
        assert_eq!(out.records()[1]["a"], 1.0);
        assert_eq!(out.records()[0]["b"], 1.0);
        assert!(!out.records()[1].contains_key("b"));
    }

    #[test]
    fn eliminated_levels_are_stored_for_the_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());
        let names = store_eliminated_levels(&dataset(), [0, 1], ScoreCriterion::FClassif, &store, "bc_elimination", true)
            .unwrap();
        assert_eq!(names, vec!["bc_elimination#k=0".to_string(), "bc_elimination#k=1".to_string()]);

        assert_eq!(store.read("bc_elimination#k=0", true).unwrap(), dataset());
        let reduced = store.read("bc_elimination#k=1", true).unwrap();
        assert!(reduced.records().iter().all(|r| !r.contains_key("R1") && r.len() == 2));
        assert!(!store.exists("bc_elimination#k=2", true));
    }
}
