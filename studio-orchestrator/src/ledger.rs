//! Job Ledger
//!
//! In-memory registry of job records. The ledger assigns job ids, enforces
//! the lifecycle state machine and serves status snapshots.
//!
//! Locking is two-level: a read-write lock over the id index and one mutex
//! per job. Transitions take the index read lock only long enough to clone
//! the job handle, then serialize on that job's mutex, so work on different
//! jobs never contends on a job lock and `get` never waits on an engine.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use studio_core::domain::job::{ErrorKind, Job, JobError, JobState, StageKind};
use thiserror::Error;
use uuid::Uuid;

/// Attempts at drawing an unused id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// Ledger error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("job {0} not found")]
    NotFound(Uuid),

    #[error("job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: JobState,
        to: JobState,
    },

    #[error("ledger exhausted: {0}")]
    ResourceExhausted(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            LedgerError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
        }
    }
}

type JobSlot = Arc<Mutex<Job>>;

/// Owner of every job record for the lifetime of the process
pub struct Ledger {
    jobs: RwLock<HashMap<Uuid, JobSlot>>,
    capacity: usize,
}

impl Ledger {
    /// Creates an empty ledger holding at most `capacity` jobs
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Allocates a fresh id and stores a pending job under it
    pub fn create(&self, kind: StageKind) -> Result<Uuid, LedgerError> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);

        if jobs.len() >= self.capacity {
            return Err(LedgerError::ResourceExhausted(format!(
                "ledger holds {} jobs (capacity {})",
                jobs.len(),
                self.capacity
            )));
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = Uuid::new_v4();
            if let Entry::Vacant(slot) = jobs.entry(id) {
                slot.insert(Arc::new(Mutex::new(Job::new(id, kind))));
                tracing::debug!(job_id = %id, %kind, "job created");
                return Ok(id);
            }
        }

        Err(LedgerError::ResourceExhausted(
            "could not allocate an unused job id".to_string(),
        ))
    }

    /// pending -> running
    pub fn mark_running(&self, id: Uuid) -> Result<(), LedgerError> {
        self.transition(id, JobState::Running, |job| {
            job.started_at = Some(chrono::Utc::now());
        })
    }

    /// {pending, running} -> completed, storing `result` verbatim
    pub fn complete(&self, id: Uuid, result: serde_json::Value) -> Result<(), LedgerError> {
        self.transition(id, JobState::Completed, |job| {
            job.result = Some(result);
            job.completed_at = Some(chrono::Utc::now());
        })
    }

    /// {pending, running} -> failed, storing `error` verbatim
    pub fn fail(&self, id: Uuid, error: JobError) -> Result<(), LedgerError> {
        self.transition(id, JobState::Failed, |job| {
            job.error = Some(error);
            job.completed_at = Some(chrono::Utc::now());
        })
    }

    /// Snapshot of a job as of its last completed mutation
    pub fn get(&self, id: Uuid) -> Result<Job, LedgerError> {
        let slot = self.slot(id)?;
        let job = lock(&slot);
        Ok(job.clone())
    }

    /// Snapshots of every job, oldest first
    pub fn list(&self) -> Vec<Job> {
        let slots: Vec<JobSlot> = self
            .jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut jobs: Vec<Job> = slots.iter().map(|slot| lock(slot).clone()).collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evicts terminal jobs that finished before `cutoff`
    ///
    /// Pending and running jobs are never evicted. Returns how many jobs were removed.
    pub fn sweep(&self, cutoff: chrono::DateTime<chrono::Utc>) -> usize {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let before = jobs.len();

        jobs.retain(|_, slot| {
            let job = lock(slot);
            !(job.state.is_terminal() && job.completed_at.is_some_and(|done| done < cutoff))
        });

        before - jobs.len()
    }

    fn slot(&self, id: Uuid) -> Result<JobSlot, LedgerError> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }

    fn transition(
        &self,
        id: Uuid,
        to: JobState,
        apply: impl FnOnce(&mut Job),
    ) -> Result<(), LedgerError> {
        let slot = self.slot(id)?;
        let mut job = lock(&slot);

        if !job.state.can_transition_to(to) {
            return Err(LedgerError::InvalidTransition {
                id,
                from: job.state,
                to,
            });
        }

        apply(&mut job);
        job.state = to;

        tracing::debug!(job_id = %id, kind = %job.kind, state = %to, "job transitioned");
        Ok(())
    }
}

// A poisoned job lock still guards a consistent record: fields are only
// written after the transition check succeeds and none of the writes panic.
fn lock(slot: &Mutex<Job>) -> MutexGuard<'_, Job> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
