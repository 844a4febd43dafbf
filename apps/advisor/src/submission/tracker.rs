use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::task::AbortHandle;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    #[error("superseded by a newer submission")]
    Superseded,

    #[error("submission task failed")]
    Failed,
}

#[derive(Default)]
struct InFlight {
    next_ticket: u64,
    tasks: HashMap<Uuid, (u64, AbortHandle)>,
}

/// Keeps at most one in-flight task per session. Starting a new one aborts the old one.
///
/// Tickets are issued and registered under one lock, so a later `run` always holds the
/// higher ticket. Each task removes its own entry when it ends, even if the caller has
/// gone away.
#[derive(Clone, Default)]
pub struct SubmissionTracker {
    in_flight: Arc<Mutex<InFlight>>,
}

/// Drops the session entry if it still belongs to this ticket.
struct Release {
    in_flight: Arc<Mutex<InFlight>>,
    session_id: Uuid,
    ticket: u64,
}

impl Drop for Release {
    fn drop(&mut self) {
        let mut state = lock(&self.in_flight);
        if state.tasks.get(&self.session_id).map(|(t, _)| *t) == Some(self.ticket) {
            state.tasks.remove(&self.session_id);
        }
    }
}

impl SubmissionTracker {
    pub async fn run<F>(&self, session_id: Uuid, fut: F) -> Result<F::Output, TrackError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (handle, previous) = {
            let mut state = lock(&self.in_flight);
            let ticket = state.next_ticket;
            state.next_ticket += 1;

            let in_flight = Arc::clone(&self.in_flight);
            let handle = tokio::spawn(async move {
                let _release = Release {
                    in_flight,
                    session_id,
                    ticket,
                };
                fut.await
            });

            let previous = state
                .tasks
                .insert(session_id, (ticket, handle.abort_handle()));
            (handle, previous)
        };

        // outside the lock: the aborted task's guard takes it when dropped
        if let Some((old_ticket, old)) = previous {
            debug!("Aborting submission {old_ticket} for session {session_id}");
            old.abort();
        }

        match handle.await {
            Ok(output) => Ok(output),
            Err(e) if e.is_cancelled() => Err(TrackError::Superseded),
            Err(e) => {
                error!("Submission task for session {session_id} failed: {e}");
                Err(TrackError::Failed)
            }
        }
    }

    #[cfg(test)]
    pub fn in_flight(&self, session_id: Uuid) -> bool {
        lock(&self.in_flight).tasks.contains_key(&session_id)
    }
}

fn lock(in_flight: &Mutex<InFlight>) -> MutexGuard<'_, InFlight> {
    // poisoning leaves the map consistent
    in_flight.lock().unwrap_or_else(|e| e.into_inner())
}
