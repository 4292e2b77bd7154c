//! Run lifecycle: cancellation handles and the single active run.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use tabweaver_protocols::GroupingError;

/// Handle to one grouping run.
///
/// Cancellation is cooperative: the run checks its handle at await
/// boundaries and exits silently once cancelled.
#[derive(Debug, Clone)]
pub struct RunHandle {
    id: Uuid,
    token: CancellationToken,
}

impl RunHandle {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `Err(GroupingError::Cancelled)` once cancelled.
    pub fn check(&self) -> Result<(), GroupingError> {
        if self.is_cancelled() {
            Err(GroupingError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Owns the active run. Starting a run cancels whichever run was active.
#[derive(Debug, Default, Clone)]
pub struct RunManager {
    active: Arc<Mutex<Option<RunHandle>>>,
}

impl RunManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the active run, if any, and install a fresh one.
    pub fn begin(&self) -> RunHandle {
        let handle = RunHandle::new();
        let previous = self.active.lock().replace(handle.clone());
        if let Some(previous) = previous {
            debug!("Run {} superseded by {}", previous.id, handle.id);
            previous.cancel();
        }
        handle
    }

    /// Clear the active slot if it still holds `handle`.
    pub fn finish(&self, handle: &RunHandle) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|h| h.id == handle.id) {
            *active = None;
        }
    }

    #[cfg(test)]
    fn active(&self) -> Option<RunHandle> {
        self.active.lock().clone()
    }

    #[cfg(test)]
    fn is_active(&self, handle: &RunHandle) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|h| h.id == handle.id)
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
