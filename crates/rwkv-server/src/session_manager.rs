//! Session concurrency control for chat requests.
//!
//! The evaluation backend is a process-wide shared resource; backends that
//! cannot evaluate concurrently are serialized by running the limit at 1.
//! At capacity, requests fail fast instead of queueing.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

/// Caps the number of generations running at once.
pub struct SessionManager {
    concurrency_limit: Arc<Semaphore>,
    max_concurrent: usize,
}

/// Holds a concurrency slot for the duration of one chat turn.
///
/// The slot is released when the guard drops, including when the handler's
/// future is cancelled by a client disconnect.
pub struct SessionGuard {
    session_id: Uuid,
    _permit: OwnedSemaphorePermit,
}

impl SessionGuard {
    /// Get the session ID (used for log correlation).
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

impl SessionManager {
    /// Create a new session manager with the given concurrency limit.
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        Arc::new(Self {
            concurrency_limit: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        })
    }

    /// Try to acquire a slot without blocking. Returns `None` at capacity.
    pub fn try_acquire(&self, session_id: Uuid) -> Option<SessionGuard> {
        let permit = self.concurrency_limit.clone().try_acquire_owned().ok()?;
        Some(SessionGuard {
            session_id,
            _permit: permit,
        })
    }

    /// Maximum concurrent sessions allowed.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of free slots.
    pub fn available_permits(&self) -> usize {
        self.concurrency_limit.available_permits()
    }

    /// Number of sessions currently holding a slot.
    pub fn active_count(&self) -> usize {
        self.max_concurrent - self.concurrency_limit.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_reports_its_session_id() {
        let manager = SessionManager::new(1);
        let id = Uuid::new_v4();
        let guard = manager.try_acquire(id).unwrap();
        assert_eq!(guard.session_id(), id);
    }

    #[test]
    fn slots_are_released_on_drop() {
        let manager = SessionManager::new(2);
        assert_eq!(manager.max_concurrent(), 2);
        let a = manager.try_acquire(Uuid::new_v4()).unwrap();
        let b = manager.try_acquire(Uuid::new_v4()).unwrap();
        assert_eq!(manager.active_count(), 2);
        assert!(manager.try_acquire(Uuid::new_v4()).is_none());

        drop(a);
        assert_eq!(manager.available_permits(), 1);
        let _c = manager.try_acquire(Uuid::new_v4()).unwrap();
        drop(b);
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let manager = SessionManager::new(0);
        assert!(manager.try_acquire(Uuid::new_v4()).is_none());
    }
}
