//! Asynchronous analysis engine.
//!
//! `submit` validates the file set, records a Queued job, and spawns a
//! pipeline task; callers poll `status` for progress. Detector fan-out is
//! CPU-bound and runs on the blocking pool so the async runtime stays
//! responsive. Cancellation is cooperative: the pipeline checks for it at
//! every stage boundary and stops before starting the next stage.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use rayon::prelude::*;
use uuid::Uuid;

use super::{JobRecord, JobStore, Stage};
use crate::analyzers::{self, SourceFile};
use crate::config::EngineOptions;
use crate::errors::AnalysisError;
use crate::index::RetrievalIndex;
use crate::report;

/// Interval at which `wait` re-reads the job record.
const POLL_INTERVAL_MS: u64 = 25;

#[derive(Clone)]
pub struct AnalysisEngine {
    store: JobStore,
    indexes: Arc<DashMap<Uuid, Arc<RetrievalIndex>>>,
    options: EngineOptions,
}

impl AnalysisEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            store: JobStore::new(),
            indexes: Arc::new(DashMap::new()),
            options,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Submit a file set for analysis and return the job id immediately.
    ///
    /// An empty submission still yields an id; its record is already
    /// Failed with a validation message when first observed.
    pub fn submit(&self, files: BTreeMap<String, String>) -> Uuid {
        let id = Uuid::new_v4();
        let mut record = JobRecord::new_queued(id);

        if files.is_empty() {
            let err = AnalysisError::Validation("no files submitted".to_string());
            record.fail(err.to_string());
            self.store.insert(record);
            tracing::warn!(job = %id, "rejected empty submission");
            return id;
        }

        self.store.insert(record);
        tracing::info!(job = %id, files = files.len(), "job submitted");

        let store = self.store.clone();
        let indexes = Arc::clone(&self.indexes);
        let timeout_secs = self.options.timeout_secs;
        tokio::spawn(async move {
            let pipeline = Self::run_pipeline(store.clone(), indexes, id, files);
            match tokio::time::timeout(Duration::from_secs(timeout_secs), pipeline).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::error!(job = %id, error = %err, "pipeline failed");
                    store.update(id, |r| r.fail(err.to_string()));
                }
                Err(_) => {
                    let err = AnalysisError::Timeout(timeout_secs);
                    tracing::error!(job = %id, error = %err, "pipeline timed out");
                    store.update(id, |r| r.fail(err.to_string()));
                }
            }
        });

        id
    }

    /// Snapshot of a job's current record.
    pub fn status(&self, id: Uuid) -> Option<JobRecord> {
        self.store.get(id)
    }

    /// Request cancellation. Returns false for unknown or terminal jobs.
    pub fn cancel(&self, id: Uuid) -> bool {
        let cancelled = self.store.cancel(id);
        if cancelled {
            tracing::info!(job = %id, "cancellation requested");
        }
        cancelled
    }

    /// Assemble retrieval context for a question about a finished job.
    ///
    /// Returns None for unknown jobs. Jobs without an index (still
    /// running, failed, or degraded) get an explicit message instead of
    /// silence.
    pub fn context(&self, id: Uuid, question: &str, top_k: Option<usize>) -> Option<String> {
        self.store.get(id)?;
        let k = top_k.unwrap_or(self.options.top_k);
        let Some(index) = self.indexes.get(&id).map(|i| Arc::clone(i.value())) else {
            return Some("No retrieval index is available for this job.".to_string());
        };
        let context = index.assemble_context(question, k);
        if context.is_empty() {
            return Some("No code relevant to the question was found.".to_string());
        }
        Some(context)
    }

    /// Poll until the job reaches a terminal state.
    pub async fn wait(&self, id: Uuid) -> Option<JobRecord> {
        loop {
            let record = self.store.get(id)?;
            if record.status.is_terminal() {
                return Some(record);
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    async fn run_pipeline(
        store: JobStore,
        indexes: Arc<DashMap<Uuid, Arc<RetrievalIndex>>>,
        id: Uuid,
        files: BTreeMap<String, String>,
    ) -> Result<(), AnalysisError> {
        if !begin_stage(&store, id, Stage::Intake) {
            return Ok(());
        }
        let sources: Vec<SourceFile> = files
            .into_iter()
            .map(|(path, content)| {
                let language = analyzers::language_for_path(&path);
                SourceFile::new(path, content, &language)
            })
            .collect();
        let sources = Arc::new(sources);

        if !begin_stage(&store, id, Stage::Detection) {
            return Ok(());
        }
        let srcs = Arc::clone(&sources);
        let analyses = tokio::task::spawn_blocking(move || {
            srcs.par_iter()
                .map(|file| analyzers::detector_for_path(&file.path).analyze(&file.path, &file.content))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| AnalysisError::stage("detection", e))?;

        if !begin_stage(&store, id, Stage::Scoring) {
            return Ok(());
        }
        let report = report::build_report(&sources, &analyses);

        if !begin_stage(&store, id, Stage::Indexing) {
            return Ok(());
        }
        let srcs = Arc::clone(&sources);
        let findings = report.findings.clone();
        match tokio::task::spawn_blocking(move || RetrievalIndex::build(&srcs, &findings)).await {
            Ok(index) => {
                indexes.insert(id, Arc::new(index));
            }
            Err(e) => {
                // Index construction failures degrade the job instead of
                // failing it; the report is still delivered.
                let err = AnalysisError::Indexing(e.to_string());
                tracing::warn!(job = %id, error = %err, "continuing without retrieval index");
            }
        }

        if !begin_stage(&store, id, Stage::Finalizing) {
            return Ok(());
        }
        let score = report.summary.quality_score;
        store.update(id, |r| r.complete(report));
        tracing::info!(job = %id, score, "job completed");
        Ok(())
    }
}

/// Mark the record as entering `stage`. Returns false when the pipeline
/// should stop: the job was cancelled or no longer exists.
fn begin_stage(store: &JobStore, id: Uuid, stage: Stage) -> bool {
    if store.is_cancelled(id) {
        tracing::info!(job = %id, stage = %stage, "job cancelled, stopping pipeline");
        return false;
    }
    tracing::debug!(job = %id, stage = %stage, "entering stage");
    store.update(id, |r| r.enter_stage(stage))
}
