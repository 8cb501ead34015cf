//! Detached job dispatcher
//!
//! Runs engine work for detached submissions on spawned tasks. Workers never
//! touch the ledger directly: they report lifecycle events over a channel to
//! a single writer task, which applies them in the order they arrive.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use studio_core::domain::job::{JobError, StageKind};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::EngineError;
use crate::ledger::Ledger;

/// Events buffered between workers and the ledger writer
const EVENT_BUFFER: usize = 256;

/// Lifecycle event reported by a worker
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    Started(Uuid),
    Finished(Uuid, Value),
    Failed(Uuid, JobError),
}

impl LedgerEvent {
    pub fn job_id(&self) -> Uuid {
        match self {
            LedgerEvent::Started(id) | LedgerEvent::Finished(id, _) | LedgerEvent::Failed(id, _) => {
                *id
            }
        }
    }
}

/// Spawns detached engine work, at most `max_parallel_jobs` at a time
#[derive(Clone)]
pub struct Dispatcher {
    events: mpsc::Sender<LedgerEvent>,
    semaphore: Arc<Semaphore>,
}

impl Dispatcher {
    /// Starts the ledger writer task and returns a handle for dispatching work
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(ledger: Arc<Ledger>, max_parallel_jobs: usize) -> Self {
        let (events, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(write_events(ledger, rx));

        Self {
            events,
            semaphore: Arc::new(Semaphore::new(max_parallel_jobs.max(1))),
        }
    }

    /// Queues `work` for job `job_id`; the job must already exist as pending
    pub fn dispatch<F>(&self, job_id: Uuid, kind: StageKind, work: F)
    where
        F: Future<Output = Result<Value, EngineError>> + Send + 'static,
    {
        let events = self.events.clone();
        let semaphore = Arc::clone(&self.semaphore);

        tokio::spawn(async move {
            let permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Worker pool closed, dropping job {}: {}", job_id, e);
                    return;
                }
            };
            run_job(job_id, kind, work, events, permit).await;
        });
    }
}

async fn run_job<F>(
    job_id: Uuid,
    kind: StageKind,
    work: F,
    events: mpsc::Sender<LedgerEvent>,
    _permit: OwnedSemaphorePermit,
) where
    F: Future<Output = Result<Value, EngineError>>,
{
    info!("Starting detached {} job {}", kind, job_id);
    send(&events, LedgerEvent::Started(job_id)).await;

    let event = match work.await {
        Ok(result) => LedgerEvent::Finished(job_id, result),
        Err(e) => {
            warn!("Engine failed for {} job {}: {}", kind, job_id, e);
            LedgerEvent::Failed(job_id, JobError::engine_failure(e.public_message()))
        }
    };
    send(&events, event).await;
    // Permit is released when dropped
}

async fn send(events: &mpsc::Sender<LedgerEvent>, event: LedgerEvent) {
    let job_id = event.job_id();
    if events.send(event).await.is_err() {
        error!("Ledger writer has stopped; event for job {} lost", job_id);
    }
}

/// Applies worker events to the ledger until every sender is gone
async fn write_events(ledger: Arc<Ledger>, mut rx: mpsc::Receiver<LedgerEvent>) {
    debug!("Ledger writer started");

    while let Some(event) = rx.recv().await {
        let job_id = event.job_id();
        let applied = match event {
            LedgerEvent::Started(id) => ledger.mark_running(id),
            LedgerEvent::Finished(id, result) => ledger.complete(id, result),
            LedgerEvent::Failed(id, error) => ledger.fail(id, error),
        };

        match applied {
            Ok(()) => debug!("Applied event for job {}", job_id),
            Err(e) => error!("Ledger rejected event for job {}: {}", job_id, e),
        }
    }

    debug!("Ledger writer stopped");
}
