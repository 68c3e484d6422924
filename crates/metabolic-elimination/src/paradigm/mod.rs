//! PARADIGM integration: input file generation, per-pathway invocation and
//! per-level aggregation of the inferred reaction activities.
pub mod aggregate;
pub mod driver;
pub mod files;

pub use aggregate::{merge_observations, ResultAggregator};
pub use driver::{
    parse_tool_output, InferenceDriver, Invocation, Observation, PathwayRun, ProcessInvoker, RunState,
    SampleBlocks, ToolInvoker,
};
pub use files::{write_evidence_file, PathwayFileGenerator};
