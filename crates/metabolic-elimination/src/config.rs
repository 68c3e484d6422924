use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Central configuration for classifiers used by sweep pipelines.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub learning_rate: f32,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        debug: bool,
        loss_type: String,
    },
    NearestCentroid {},
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GBDT {
            max_depth: 6,
            num_boost_round: 50,
            debug: false,
            loss_type: "LogLikelyhood".to_string(),
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelType::default()),
            "nearest_centroid" | "centroid" => Ok(ModelType::NearestCentroid {}),
            _ => Err(format!("Unknown model type: {}", s)),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f32, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            model_type: ModelType::default(),
        }
    }
}

/// Inputs and literals for the PARADIGM stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParadigmConfig {
    /// Path to the PARADIGM executable.
    pub tool: PathBuf,
    /// Directory holding pathway files, the run configuration and evidence files.
    pub work_dir: PathBuf,
    /// File name of the run configuration inside `work_dir`.
    pub config_file: String,
    /// Evidence files are named `{evidence_prefix}_k={k}_data.tsv`.
    pub evidence_prefix: String,
    /// Lower and upper evidence discretization thresholds.
    pub disc: (f64, f64),
    /// `epsilon` and `epsilon0` evidence thresholds.
    pub epsilons: (f64, f64),
    /// Pathways whose file stem starts with one of these are never run.
    pub excluded_prefixes: Vec<String>,
    /// Aggregated datasets are stored as `{result_name}#k={k}`.
    pub result_name: String,
    pub gz: bool,
}

impl Default for ParadigmConfig {
    fn default() -> Self {
        Self {
            tool: PathBuf::from("./paradigm"),
            work_dir: PathBuf::from("../outputs/paradigm"),
            config_file: "bc.cfg".to_string(),
            evidence_prefix: "BC".to_string(),
            disc: (-0.5, 0.5),
            epsilons: (0.01, 0.2),
            excluded_prefixes: vec!["Transport".to_string(), "Exchange".to_string()],
            result_name: "paradigm_results".to_string(),
            gz: false,
        }
    }
}

/// Elimination levels and cross-validation settings for a sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
    pub n_splits: usize,
    /// Shuffle samples within each class before assigning folds.
    pub shuffle_seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: 0,
            stop: 110,
            step: 10,
            n_splits: 10,
            shuffle_seed: None,
        }
    }
}

/// Load any of the configuration structs from a JSON file.
pub fn load_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: T = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
