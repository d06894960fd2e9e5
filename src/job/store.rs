//! Concurrent job-status store.
//!
//! Process-scoped and ephemeral: durable persistence of reports belongs to
//! an external collaborator. The map supports a single writer (the
//! pipeline task owning the job) and many readers per key; readers always
//! see cloned snapshots.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::{JobRecord, JobStatus};

#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Arc<DashMap<Uuid, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: JobRecord) {
        self.jobs.insert(record.id, record);
    }

    /// Snapshot of a job record.
    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.get(&id).map(|r| r.clone())
    }

    pub fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.jobs.get(&id).map(|r| r.status)
    }

    /// Apply a mutation under the per-key lock. Returns false if the job
    /// does not exist.
    pub fn update<F>(&self, id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut JobRecord),
    {
        match self.jobs.get_mut(&id) {
            Some(mut record) => {
                f(&mut record);
                true
            }
            None => false,
        }
    }

    /// Request cancellation. Returns true if the job transitioned.
    pub fn cancel(&self, id: Uuid) -> bool {
        match self.jobs.get_mut(&id) {
            Some(mut record) => record.cancel(),
            None => false,
        }
    }

    pub fn is_cancelled(&self, id: Uuid) -> bool {
        self.status(id) == Some(JobStatus::Cancelled)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Stage;

    #[test]
    fn test_insert_and_snapshot() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.insert(JobRecord::new_queued(id));

        let snapshot = store.get(id).unwrap();
        assert_eq!(snapshot.status, JobStatus::Queued);
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_update_mutates_under_lock() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.insert(JobRecord::new_queued(id));

        assert!(store.update(id, |r| r.enter_stage(Stage::Detection)));
        assert_eq!(store.status(id), Some(JobStatus::Processing));
    }

    #[test]
    fn test_cancel_before_processing() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.insert(JobRecord::new_queued(id));

        assert!(store.cancel(id));
        assert!(store.is_cancelled(id));
        // The record stays cancelled with no report.
        let record = store.get(id).unwrap();
        assert!(record.report.is_none());
    }

    #[test]
    fn test_cancel_unknown_job() {
        let store = JobStore::new();
        assert!(!store.cancel(Uuid::new_v4()));
    }

    #[test]
    fn test_clones_share_state() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.insert(JobRecord::new_queued(id));

        let other = store.clone();
        assert!(other.cancel(id));
        assert!(store.is_cancelled(id));
    }
}
