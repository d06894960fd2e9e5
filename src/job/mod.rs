//! Analysis job lifecycle.
//!
//! A job is one asynchronous execution of the analysis pipeline for a
//! submitted file set. Records move `Queued -> Processing -> {Completed |
//! Failed | Cancelled}`; terminal records are immutable and transitions
//! that would violate the machine are ignored. Progress is monotonically
//! non-decreasing while Processing.

mod engine;
mod store;

pub use engine::AnalysisEngine;
pub use store::JobStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::AnalysisReport;

/// Job lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intake,
    Detection,
    Scoring,
    Indexing,
    Finalizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intake => "intake",
            Stage::Detection => "detection",
            Stage::Scoring => "scoring",
            Stage::Indexing => "indexing",
            Stage::Finalizing => "finalizing",
        }
    }

    /// Progress value reached when the stage begins.
    pub fn progress(&self) -> u8 {
        match self {
            Stage::Intake => 5,
            Stage::Detection => 25,
            Stage::Scoring => 60,
            Stage::Indexing => 80,
            Stage::Finalizing => 95,
        }
    }

    /// Human-readable status message for the stage.
    pub fn message(&self) -> &'static str {
        match self {
            Stage::Intake => "Reading submitted files",
            Stage::Detection => "Running per-file detectors",
            Stage::Scoring => "Scoring and prioritizing findings",
            Stage::Indexing => "Building retrieval index",
            Stage::Finalizing => "Finalizing report",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One job's mutable record. Owned by the pipeline task executing it;
/// everyone else sees cloned snapshots through the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    /// Percentage in [0, 100], monotonically non-decreasing.
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new_queued(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Queued,
            progress: 0,
            message: "Queued for analysis".to_string(),
            report: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Enter a pipeline stage. Ignored on terminal records; progress
    /// never moves backwards.
    pub fn enter_stage(&mut self, stage: Stage) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Processing;
        self.progress = self.progress.max(stage.progress());
        self.message = stage.message().to_string();
        self.touch();
    }

    /// Transition to Completed with the finished report.
    pub fn complete(&mut self, report: AnalysisReport) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.message = "Analysis complete".to_string();
        self.report = Some(report);
        self.touch();
    }

    /// Transition to Failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.message = "Analysis failed".to_string();
        self.error = Some(error.into());
        self.touch();
    }

    /// Request cancellation. Returns false (no-op) on terminal records.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Cancelled;
        self.message = "Analysis cancelled".to_string();
        self.touch();
        true
    }
}
