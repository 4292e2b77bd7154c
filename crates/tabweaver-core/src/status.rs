//! Status and preview records on the persisted key-value channel.
//!
//! The orchestrator is the only writer. Each write replaces the whole
//! record. Writes made on behalf of a run go through [`StatusStore`]'s
//! write lock and are dropped once that run is cancelled, so a superseded
//! run can never overwrite the status of its successor.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

use tabweaver_config::StatusConfig;
use tabweaver_protocols::{KeyValueStore, StoreError, StoreEvent, TabId, WindowId};

use crate::partition::DomainGroups;
use crate::run::RunHandle;

pub const STATUS_KEY: &str = "tab_grouping_status";
pub const PREVIEW_KEY: &str = "tab_grouping_preview";

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Analyzing,
    Preview,
    Grouping,
    Complete,
    Error,
}

impl StatusKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, StatusKind::Complete | StatusKind::Error)
    }
}

/// One created group as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetail {
    pub name: String,
    pub tab_count: usize,
}

/// The `tab_grouping_status` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub status: StatusKind,
    pub message: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_details: Option<Vec<GroupDetail>>,
}

impl StatusRecord {
    pub fn new(status: StatusKind, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            timestamp: now_ms(),
            group_count: None,
            failed_count: None,
            group_details: None,
        }
    }

    pub fn analyzing(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Analyzing, message)
    }

    pub fn preview(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Preview, message)
    }

    pub fn grouping(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Grouping, message)
    }

    pub fn complete(message: impl Into<String>, details: Vec<GroupDetail>, failed: usize) -> Self {
        Self {
            group_count: Some(details.len()),
            failed_count: Some(failed),
            group_details: Some(details),
            ..Self::new(StatusKind::Complete, message)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, message)
    }

    pub fn with_counts(mut self, group_count: usize, failed_count: usize) -> Self {
        self.group_count = Some(group_count);
        self.failed_count = Some(failed_count);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the record is at most `max_age` old at `now` (ms).
    pub fn is_fresh(&self, now: i64, max_age: Duration) -> bool {
        let max_age = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(self.timestamp) <= max_age
    }
}

/// One domain group awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewGroup {
    pub tab_ids: Vec<TabId>,
    pub urls: Vec<String>,
    pub count: usize,
}

/// The `tab_grouping_preview` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRecord {
    pub groups: BTreeMap<String, PreviewGroup>,
    pub window_id: WindowId,
    pub timestamp: i64,
}

impl PreviewRecord {
    pub fn new(groups: &DomainGroups, window_id: WindowId) -> Self {
        let groups = groups
            .iter()
            .map(|g| {
                (
                    g.domain.clone(),
                    PreviewGroup {
                        tab_ids: g.tab_ids.clone(),
                        urls: g.urls.clone(),
                        count: g.len(),
                    },
                )
            })
            .collect();
        Self {
            groups,
            window_id,
            timestamp: now_ms(),
        }
    }

    pub fn tab_count(&self) -> usize {
        self.groups.values().map(|g| g.count).sum()
    }
}

/// Typed access to the status and preview keys.
pub struct StatusStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
    freshness: Duration,
}

impl StatusStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            freshness: Duration::from_secs(30),
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    /// Write `record` unless `run` has been cancelled.
    ///
    /// Returns whether the record was written.
    pub async fn publish_for(
        &self,
        run: &RunHandle,
        record: &StatusRecord,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if run.is_cancelled() {
            debug!(run = %run.id(), status = ?record.status, "Dropping status of cancelled run");
            return Ok(false);
        }
        self.store
            .set(STATUS_KEY, serde_json::to_value(record)?)
            .await?;
        trace!(run = %run.id(), status = ?record.status, "Status published");
        Ok(true)
    }

    /// Write the preview record unless `run` has been cancelled.
    pub async fn save_preview_for(
        &self,
        run: &RunHandle,
        preview: &PreviewRecord,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if run.is_cancelled() {
            return Ok(false);
        }
        self.store
            .set(PREVIEW_KEY, serde_json::to_value(preview)?)
            .await?;
        Ok(true)
    }

    /// Remove the preview record unless `run` has been cancelled.
    pub async fn clear_preview_for(&self, run: &RunHandle) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if run.is_cancelled() {
            return Ok(false);
        }
        self.store.remove(&[PREVIEW_KEY]).await?;
        Ok(true)
    }

    /// Remove both records. Used when a preview is cancelled.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&[PREVIEW_KEY, STATUS_KEY]).await
    }

    pub async fn load(&self) -> Result<Option<StatusRecord>, StoreError> {
        match self.store.get(STATUS_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// The status record if it is fresh. A stale record is removed.
    pub async fn load_fresh(&self) -> Result<Option<StatusRecord>, StoreError> {
        let Some(record) = self.load().await? else {
            return Ok(None);
        };
        if record.is_fresh(now_ms(), self.freshness) {
            return Ok(Some(record));
        }

        debug!("Discarding stale {:?} status from {}", record.status, record.timestamp);
        let _guard = self.write_lock.lock().await;
        // Re-read under the lock so a concurrent fresh write survives.
        if let Some(value) = self.store.get(STATUS_KEY).await? {
            let current: StatusRecord = serde_json::from_value(value)?;
            if current == record {
                self.store.remove(&[STATUS_KEY]).await?;
            }
        }
        Ok(None)
    }

    pub async fn load_preview(&self) -> Result<Option<PreviewRecord>, StoreError> {
        match self.store.get(PREVIEW_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

/// Waits for the status channel to settle, the way the UI does.
///
/// Listens for change notifications and also polls, so a missed or lagged
/// notification only delays the answer. Gives up after the UI timeout.
pub struct StatusWatcher {
    status: Arc<StatusStore>,
    timeout: Duration,
    poll_interval: Duration,
}

impl StatusWatcher {
    pub fn new(status: Arc<StatusStore>) -> Self {
        Self {
            status,
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(300),
        }
    }

    pub fn from_config(status: Arc<StatusStore>, config: &StatusConfig) -> Self {
        Self {
            status,
            timeout: Duration::from_secs(config.ui_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait for a `preview`, `complete` or `error` record written at or
    /// after `since` (ms).
    pub async fn wait_settled(&self, since: i64) -> Result<Option<StatusRecord>, StoreError> {
        self.wait_for(since, |r| r.status == StatusKind::Preview || r.is_terminal())
            .await
    }

    /// Wait for a terminal record written at or after `since` (ms).
    pub async fn wait_terminal(&self, since: i64) -> Result<Option<StatusRecord>, StoreError> {
        self.wait_for(since, StatusRecord::is_terminal).await
    }

    /// Wait for a record at or after `since` that satisfies `accept`.
    ///
    /// Returns `Ok(None)` on timeout.
    pub async fn wait_for(
        &self,
        since: i64,
        accept: impl Fn(&StatusRecord) -> bool,
    ) -> Result<Option<StatusRecord>, StoreError> {
        let deadline = Instant::now() + self.timeout;
        let mut events = Some(self.status.subscribe());
        let wanted = |r: &StatusRecord| r.timestamp >= since && accept(r);

        if let Some(record) = self.status.load().await? {
            if wanted(&record) {
                return Ok(Some(record));
            }
        }

        let mut next_poll = Instant::now() + self.poll_interval;
        loop {
            if Instant::now() >= deadline {
                debug!("Status wait timed out after {:?}", self.timeout);
                return Ok(None);
            }

            let event = match events.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        received = rx.recv() => Some(received),
                        _ = sleep_until(next_poll.min(deadline)) => None,
                    }
                }
                None => {
                    sleep_until(next_poll.min(deadline)).await;
                    None
                }
            };

            match event {
                Some(Ok(StoreEvent::Set { key, value })) if key == STATUS_KEY => {
                    if let Ok(record) = serde_json::from_value::<StatusRecord>(value) {
                        if wanted(&record) {
                            return Ok(Some(record));
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    trace!("Status watcher lagged by {} events", skipped);
                }
                Some(Err(broadcast::error::RecvError::Closed)) => events = None,
                None => {
                    next_poll = Instant::now() + self.poll_interval;
                    if let Some(record) = self.status.load().await? {
                        if wanted(&record) {
                            return Ok(Some(record));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
