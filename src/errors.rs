//! Crate error taxonomy.
//!
//! Per-file parse failures are findings, not errors, and never appear
//! here. These variants cover job-level failures: an invalid submission,
//! an error escaping a pipeline stage, an exceeded time budget, and index
//! construction problems (which degrade the index instead of failing the
//! job).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The submission cannot be analyzed at all (e.g. no files).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An error escaped a pipeline stage; the job fails, others continue.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: &'static str, message: String },

    /// The job exceeded its wall-clock budget.
    #[error("analysis timed out after {0} seconds")]
    Timeout(u64),

    /// Index construction failed; the job completes with no index.
    #[error("index construction failed: {0}")]
    Indexing(String),
}

impl AnalysisError {
    pub fn stage(stage: &'static str, err: impl std::fmt::Display) -> Self {
        AnalysisError::Stage {
            stage,
            message: err.to_string(),
        }
    }
}
