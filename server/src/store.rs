use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Job, JobStatus, JobUpdate};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("Job {0} already exists")]
    DuplicateKey(Uuid),

    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("Invalid status transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },
}

struct Entry {
    seq: u64,
    job: Job,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    jobs: HashMap<Uuid, Entry>,
}

/// In-memory job records for the lifetime of the process.
///
/// Every operation holds the same mutex for its whole duration, so updates to a
/// single job are totally ordered. Nothing here calls back into another locking
/// method while the guard is alive.
#[derive(Default)]
pub struct JobStore {
    inner: Mutex<Inner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Poison is ignored: no critical section can panic between field writes.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, job: Job) -> Result<Job, StoreError> {
        let mut inner = self.lock();
        if inner.jobs.contains_key(&job.id) {
            return Err(StoreError::DuplicateKey(job.id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(job.id, Entry { seq, job: job.clone() });
        Ok(job)
    }

    pub fn get(&self, id: &Uuid) -> Option<Job> {
        self.lock().jobs.get(id).map(|entry| entry.job.clone())
    }

    pub fn update(&self, id: &Uuid, update: JobUpdate) -> Result<Job, StoreError> {
        let mut inner = self.lock();
        let entry = inner.jobs.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        let job = &mut entry.job;

        if let Some(next) = update.status {
            if !job.status.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    id: *id,
                    from: job.status,
                    to: next,
                });
            }
            job.status = next;
        }
        if let Some(started_at) = update.started_at {
            job.started_at = Some(started_at);
        }
        if let Some(completed_at) = update.completed_at {
            job.completed_at = Some(completed_at);
        }
        if let Some(message) = update.error_message {
            job.error_message = Some(message);
        }
        job.updated_at = Utc::now();

        Ok(job.clone())
    }

    /// Snapshot of every job, newest `created_at` first. Jobs created within
    /// the same clock tick keep their insertion order (latest first).
    pub fn list_all(&self) -> Vec<Job> {
        let inner = self.lock();
        let mut entries: Vec<&Entry> = inner.jobs.values().collect();
        entries.sort_by(|a, b| {
            b.job
                .created_at
                .cmp(&a.job.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|entry| entry.job.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.lock().jobs.len()
    }
}
