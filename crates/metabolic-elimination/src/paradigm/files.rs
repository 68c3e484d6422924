//! Input files for PARADIGM: one pathway description per subsystem, the run
//! configuration, and one evidence table per elimination level.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ParadigmConfig;
use crate::dataset::FeatureRecord;
use crate::network::{PathwayModel, Subsystem};
use crate::vectorizer::DictVectorizer;

/// Evidence file suffix; must match the `suffix=` entry of the run configuration.
pub const EVIDENCE_SUFFIX: &str = "_data.tsv";

/// `{prefix}_k={k}`, the basename passed to the tool with `-b`.
pub fn evidence_basename(prefix: &str, k: usize) -> String {
    format!("{}_k={}", prefix, k)
}

pub fn evidence_file_name(prefix: &str, k: usize) -> String {
    format!("{}{}", evidence_basename(prefix, k), EVIDENCE_SUFFIX)
}

/// The two-line run configuration.
pub fn render_run_config(disc: (f64, f64), epsilons: (f64, f64)) -> String {
    format!(
        "inference [method=JTREE,updates=HUGIN,verbose=0]\n\
         evidence [suffix={},node=mRNA,disc={:.6};{:.6},epsilon={:.6},epsilon0={:.6}]\n",
        EVIDENCE_SUFFIX, disc.0, disc.1, epsilons.0, epsilons.1
    )
}

pub struct PathwayFileGenerator<'a> {
    model: &'a PathwayModel,
    config: &'a ParadigmConfig,
}

impl<'a> PathwayFileGenerator<'a> {
    pub fn new(model: &'a PathwayModel, config: &'a ParadigmConfig) -> Self {
        PathwayFileGenerator { model, config }
    }

    /// Writes every pathway file and the run configuration into the work directory.
    pub fn generate(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.work_dir;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create PARADIGM directory: {}", dir.display()))?;

        let mut written = self.write_pathway_files()?;
        written.push(self.write_run_config()?);
        log::info!("Wrote {} PARADIGM input files to {}", written.len(), dir.display());
        Ok(written)
    }

    pub fn write_pathway_files(&self) -> Result<Vec<PathBuf>> {
        let members = self.metabolites_by_subsystem();
        let mut written = Vec::with_capacity(self.model.subsystems().len());
        for subsystem in self.model.subsystems() {
            let path = self.config.work_dir.join(subsystem.pathway_file_name());
            let metabolites = members.get(subsystem.name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            std::fs::write(&path, self.render_pathway(subsystem, metabolites))
                .with_context(|| format!("Failed to write pathway file: {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }

    pub fn write_run_config(&self) -> Result<PathBuf> {
        let path = self.config.work_dir.join(&self.config.config_file);
        std::fs::write(&path, render_run_config(self.config.disc, self.config.epsilons))
            .with_context(|| format!("Failed to write run configuration: {}", path.display()))?;
        Ok(path)
    }

    /// Pathway file body: metabolites (`protein`), then reactions
    /// (`abstract`), then one `-a>` relation per reaction metabolite.
    pub fn render_pathway(&self, subsystem: &Subsystem, metabolites: &[&str]) -> String {
        let mut out = String::new();
        for metabolite in metabolites {
            out.push_str(&format!("protein\t{}\n", metabolite));
        }
        for reaction in self.model.reactions_in(&subsystem.name) {
            out.push_str(&format!("abstract\t{}\n", reaction.id));
        }
        for reaction in self.model.reactions_in(&subsystem.name) {
            for metabolite in &reaction.metabolites {
                out.push_str(&format!("{}\t{}\t-a>\n", metabolite, reaction.id));
            }
        }
        out
    }

    fn metabolites_by_subsystem(&self) -> HashMap<&'a str, Vec<&'a str>> {
        let mut members: HashMap<&str, Vec<&str>> = HashMap::new();
        for metabolite in self.model.metabolites() {
            for subsystem in self.model.connected_subsystems(&metabolite.id) {
                members.entry(subsystem).or_default().push(metabolite.id.as_str());
            }
        }
        members
    }
}

/// Writes the evidence table for level `k`: an `id` column with the sample
/// position, then one column per feature; absent values are left empty.
pub fn write_evidence_file(dir: &Path, prefix: &str, k: usize, records: &[FeatureRecord]) -> Result<PathBuf> {
    let path = dir.join(evidence_file_name(prefix, k));
    let mut vect = DictVectorizer::new();
    vect.fit(records);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Failed to create evidence file: {}", path.display()))?;

    let mut header = vec!["id".to_string()];
    header.extend(vect.vocabulary().iter().cloned());
    writer.write_record(&header)?;

    for (i, record) in records.iter().enumerate() {
        let mut row = vec![i.to_string()];
        row.extend(
            vect.vocabulary()
                .iter()
                .map(|name| record.get(name).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;

    log::debug!("Wrote evidence for {} samples to {}", records.len(), path.display());
    Ok(path)
}
