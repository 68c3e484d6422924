//! Runs PARADIGM once per (pathway, elimination level) and parses its output.
//!
//! The tool prints one block per sample. Blocks start with the literal
//! marker `"> "` followed by the integer sample index and a header line; the
//! body holds `node_id<TAB>value` lines and ends with one terminator line.
//! Blocks are not guaranteed to appear in sample order.
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;

use crate::config::ParadigmConfig;
use crate::error::{EliminationError, Result};
use crate::network::{PathwayModel, Subsystem};
use crate::paradigm::files::evidence_basename;

/// `(node_id, value)` reported for one sample.
pub type Observation = (String, f64);

/// Observations per sample, ordered by sample index.
pub type SampleBlocks = Vec<Vec<Observation>>;

const BLOCK_MARKER: &str = "> ";

/// Parse raw tool output, keeping only nodes that are reactions of the model.
pub fn parse_tool_output(text: &str, reaction_ids: &HashSet<String>) -> Result<SampleBlocks> {
    let mut blocks: Vec<(usize, Vec<Observation>)> = Vec::new();

    for segment in text.split(BLOCK_MARKER).skip(1) {
        let token = segment
            .split(|c: char| c == ' ' || c == '\n')
            .next()
            .unwrap_or_default();
        let index = token
            .trim()
            .parse::<usize>()
            .map_err(|_| EliminationError::malformed(token, "sample index is not an integer"))?;

        let body = segment.split_once('\n').map(|(_, body)| body).unwrap_or_default();
        let lines: Vec<&str> = body.lines().collect();
        let data = &lines[..lines.len().saturating_sub(1)];

        let mut observations = Vec::with_capacity(data.len());
        for line in data {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 2 {
                return Err(EliminationError::malformed(
                    line,
                    format!("expected 2 tab-separated fields, found {}", fields.len()),
                ));
            }
            let value = fields[1]
                .trim()
                .parse::<f64>()
                .map_err(|_| EliminationError::malformed(line, "value is not numeric"))?;
            observations.push((fields[0].to_string(), value));
        }
        blocks.push((index, observations));
    }

    blocks.sort_by_key(|(index, _)| *index);

    Ok(blocks
        .into_iter()
        .map(|(_, observations)| {
            observations
                .into_iter()
                .filter(|(node, _)| reaction_ids.contains(node))
                .collect()
        })
        .collect())
}

/// Fully resolved arguments of one tool run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config: PathBuf,
    pub pathway: PathBuf,
    /// Evidence basename; the tool appends the configured suffix.
    pub evidence: PathBuf,
}

/// Runs the external tool and returns its standard output.
pub trait ToolInvoker {
    fn invoke(&self, invocation: &Invocation) -> std::io::Result<String>;
}

impl<F> ToolInvoker for F
where
    F: Fn(&Invocation) -> std::io::Result<String>,
{
    fn invoke(&self, invocation: &Invocation) -> std::io::Result<String> {
        self(invocation)
    }
}

/// Spawns the executable and blocks until it exits. No timeout is applied.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    tool: PathBuf,
}

impl ProcessInvoker {
    pub fn new<P: Into<PathBuf>>(tool: P) -> Self {
        ProcessInvoker { tool: tool.into() }
    }
}

impl ToolInvoker for ProcessInvoker {
    fn invoke(&self, invocation: &Invocation) -> std::io::Result<String> {
        let output = Command::new(&self.tool)
            .arg("-c")
            .arg(&invocation.config)
            .arg("-p")
            .arg(&invocation.pathway)
            .arg("-b")
            .arg(&invocation.evidence)
            .output()?;

        if !output.status.success() {
            log::warn!(
                "{} exited with {} for {}: {}",
                self.tool.display(),
                output.status,
                invocation.pathway.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotRun,
    Running,
    Parsed,
    Failed,
}

/// Outcome of one pathway at one elimination level.
#[derive(Debug, Clone)]
pub struct PathwayRun {
    pub pathway: String,
    pub k: usize,
    pub state: RunState,
    pub blocks: SampleBlocks,
}

pub struct InferenceDriver<I = ProcessInvoker> {
    invoker: I,
    work_dir: PathBuf,
    config_file: String,
    evidence_prefix: String,
}

impl InferenceDriver<ProcessInvoker> {
    pub fn new(config: &ParadigmConfig) -> Self {
        Self::with_invoker(config, ProcessInvoker::new(&config.tool))
    }
}

impl<I: ToolInvoker> InferenceDriver<I> {
    pub fn with_invoker(config: &ParadigmConfig, invoker: I) -> Self {
        InferenceDriver {
            invoker,
            work_dir: config.work_dir.clone(),
            config_file: config.config_file.clone(),
            evidence_prefix: config.evidence_prefix.clone(),
        }
    }

    pub fn invocation(&self, subsystem: &Subsystem, k: usize) -> Invocation {
        Invocation {
            config: self.work_dir.join(&self.config_file),
            pathway: self.work_dir.join(subsystem.pathway_file_name()),
            evidence: self.work_dir.join(evidence_basename(&self.evidence_prefix, k)),
        }
    }

    /// Runs one pathway. Excluded pathways stay `NotRun`; unparsable output
    /// leaves the run `Failed` with no observations. Failing to launch the
    /// tool is returned as an error.
    pub fn run_pathway(&self, model: &PathwayModel, subsystem: &Subsystem, k: usize) -> Result<PathwayRun> {
        let mut run = PathwayRun {
            pathway: subsystem.name.clone(),
            k,
            state: RunState::NotRun,
            blocks: Vec::new(),
        };
        if subsystem.excluded {
            log::debug!("Skipping excluded pathway {}", subsystem.name);
            return Ok(run);
        }

        run.state = RunState::Running;
        log::debug!("k={}: running {}", k, subsystem.name);
        let output = self.invoker.invoke(&self.invocation(subsystem, k))?;

        match parse_tool_output(&output, model.reaction_ids()) {
            Ok(blocks) => {
                run.state = RunState::Parsed;
                run.blocks = blocks;
            }
            Err(err @ EliminationError::MalformedToolOutput { .. }) => {
                log::warn!("k={}: dropping pathway {}: {}", k, subsystem.name, err);
                run.state = RunState::Failed;
            }
            Err(err) => return Err(err),
        }
        Ok(run)
    }

    /// Every subsystem of the model at level `k`, in model order.
    pub fn run_level(&self, model: &PathwayModel, k: usize) -> Result<Vec<PathwayRun>> {
        model
            .subsystems()
            .iter()
            .map(|subsystem| self.run_pathway(model, subsystem, k))
            .collect()
    }
}
