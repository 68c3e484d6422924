//! Error taxonomy shared by the selection round trip, the PARADIGM driver and
//! the dataset store.

/// Failures raised by the elimination core.
///
/// `InvalidParameter` and `ShapeMismatch` are contract violations and are
/// always propagated. `MalformedToolOutput` is recovered per pathway by the
/// inference driver, and `DatasetNotFound` ends an evaluation sweep early.
#[derive(thiserror::Error, Debug)]
pub enum EliminationError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("malformed tool output at {line:?}: {reason}")]
    MalformedToolOutput { line: String, reason: String },

    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl EliminationError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        EliminationError::MalformedToolOutput {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EliminationError>;
