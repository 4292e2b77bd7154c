//! Grouping orchestrator.
//!
//! Drives one run through `analyzing -> preview -> grouping -> complete |
//! error`. Starting a run supersedes any earlier one. Between the preview
//! and the mutations the user confirms or cancels.

mod options;
mod outcome;

pub use options::OrchestratorOptions;
pub use outcome::{CreatedGroup, FailedGroup, PreviewOutcome, RunOutcome};

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use tabweaver_protocols::{
    GroupNamer, GroupUpdate, GroupingError, NamingRequest, NamingResponse, Tab, TabGroupColor,
    TabId, TabsApi, WindowId,
};

use crate::naming::{fallback_response, reconcile};
use crate::partition::{DomainGroup, DomainGroups, DomainPartitioner, is_accessible};
use crate::run::{RunHandle, RunManager};
use crate::status::{PreviewRecord, StatusRecord, StatusStore};

/// A preview awaiting `confirm` or `cancel`.
struct PendingPreview {
    run: RunHandle,
    window: WindowId,
    host: TabId,
    groups: DomainGroups,
}

enum GroupAttempt {
    Created(CreatedGroup),
    Failed(FailedGroup),
}

/// The stateful grouping controller.
pub struct GroupingOrchestrator {
    tabs: Arc<dyn TabsApi>,
    namer: Arc<dyn GroupNamer>,
    status: Arc<StatusStore>,
    runs: RunManager,
    partitioner: DomainPartitioner,
    options: OrchestratorOptions,
    pending: Mutex<Option<PendingPreview>>,
}

impl GroupingOrchestrator {
    pub fn new(
        tabs: Arc<dyn TabsApi>,
        namer: Arc<dyn GroupNamer>,
        status: Arc<StatusStore>,
        options: OrchestratorOptions,
    ) -> Self {
        let partitioner = DomainPartitioner::new()
            .with_strategy(options.strategy)
            .with_min_group_size(options.min_group_size);
        Self {
            tabs,
            namer,
            status,
            runs: RunManager::new(),
            partitioner,
            options,
            pending: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn status(&self) -> &Arc<StatusStore> {
        &self.status
    }

    /// Whether a preview is waiting for confirmation.
    pub fn has_pending_preview(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Start a run: analyze the active window and publish a preview.
    ///
    /// Any earlier run is cancelled first. Returns
    /// `Err(GroupingError::Cancelled)` if this run is itself superseded
    /// before it reaches the preview; nothing is published in that case.
    pub async fn begin(&self) -> Result<PreviewOutcome, GroupingError> {
        let run = self.runs.begin();
        // The older run is already cancelled, so it cannot reinstall this.
        drop(self.pending.lock().take());
        info!(run = %run.id(), "Tab grouping run started");

        let result = self.analyze(&run).await;
        match result {
            Ok(preview) => Ok(preview),
            Err(e) => Err(self.fail(&run, e).await),
        }
    }

    /// Confirm the pending preview: name the groups and create them.
    pub async fn confirm(&self) -> Result<RunOutcome, GroupingError> {
        let pending = self
            .pending
            .lock()
            .take()
            .ok_or(GroupingError::NoPendingPreview)?;
        let run = pending.run.clone();
        if run.is_cancelled() {
            return Err(GroupingError::NoPendingPreview);
        }

        let result = self.execute(&run, pending).await;
        match result {
            Ok(outcome) => {
                self.runs.finish(&run);
                Ok(outcome)
            }
            Err(e) => Err(self.fail(&run, e).await),
        }
    }

    /// Discard the pending preview and its status. Returns whether a preview
    /// was discarded.
    ///
    /// Only the preview stage is cancellable. A run that is analyzing or
    /// already grouping is left alone and its status is untouched.
    pub async fn cancel(&self) -> Result<bool, GroupingError> {
        let Some(pending) = self.pending.lock().take() else {
            debug!("No preview to cancel");
            return Ok(false);
        };
        pending.run.cancel();
        self.runs.finish(&pending.run);
        self.status.clear_all().await?;
        info!(run = %pending.run.id(), "Tab grouping cancelled");
        Ok(true)
    }

    /// `begin` followed immediately by `confirm`.
    pub async fn run_to_completion(&self) -> Result<RunOutcome, GroupingError> {
        self.begin().await?;
        self.confirm().await
    }

    /// Publish the error status for `e` unless the run was cancelled.
    async fn fail(&self, run: &RunHandle, e: GroupingError) -> GroupingError {
        if e.is_cancelled() || run.is_cancelled() {
            debug!(run = %run.id(), "Run exited after cancellation");
            return GroupingError::Cancelled;
        }

        error!(run = %run.id(), "Tab grouping failed: {}", e);
        let mut record = StatusRecord::error(e.to_string());
        if let GroupingError::NoGroupsCreated { failed } = &e {
            record = record.with_counts(0, *failed);
        }
        if let Err(store_err) = self.status.clear_preview_for(run).await {
            warn!("Failed to clear preview: {}", store_err);
        }
        if let Err(store_err) = self.status.publish_for(run, &record).await {
            warn!("Failed to publish error status: {}", store_err);
        }
        self.runs.finish(run);
        e
    }

    async fn publish(&self, run: &RunHandle, record: StatusRecord) -> Result<(), GroupingError> {
        if self.status.publish_for(run, &record).await? {
            Ok(())
        } else {
            Err(GroupingError::Cancelled)
        }
    }

    async fn analyze(&self, run: &RunHandle) -> Result<PreviewOutcome, GroupingError> {
        let active = self.tabs.active_tab().await?.ok_or(GroupingError::NoWindow)?;
        let window = active.window_id;
        debug!(window = %window, "Resolved window from active tab");

        self.publish(run, StatusRecord::analyzing("Analyzing tabs...")).await?;

        let tabs = self.tabs.query_window(window, false).await?;
        run.check()?;
        debug!("Found {} unpinned tabs", tabs.len());

        let accessible: Vec<Tab> = tabs
            .into_iter()
            .filter(|t| is_accessible(t, window, self.options.allow_loading_tabs))
            .collect();
        debug!("{} accessible tabs", accessible.len());

        let required = self.partitioner.min_group_size();
        if accessible.len() < required {
            return Err(GroupingError::InsufficientTabs {
                found: accessible.len(),
                required,
            });
        }

        let groups = self.partitioner.partition(&accessible);
        if groups.is_empty() {
            return Err(GroupingError::NoDomainGroups {
                min_group_size: required,
            });
        }

        let preview = PreviewRecord::new(&groups, window);
        if !self.status.save_preview_for(run, &preview).await? {
            return Err(GroupingError::Cancelled);
        }

        {
            let mut pending = self.pending.lock();
            run.check()?;
            *pending = Some(PendingPreview {
                run: run.clone(),
                window,
                host: accessible[0].id,
                groups: groups.clone(),
            });
        }

        let message = format!(
            "Found {} groups ({} tabs). Confirm to group them.",
            groups.len(),
            groups.tab_count()
        );
        self.publish(run, StatusRecord::preview(message)).await?;
        info!(groups = groups.len(), tabs = groups.tab_count(), "Preview ready");

        Ok(PreviewOutcome {
            run_id: run.id(),
            window_id: window,
            groups,
        })
    }

    async fn execute(
        &self,
        run: &RunHandle,
        pending: PendingPreview,
    ) -> Result<RunOutcome, GroupingError> {
        if self.status.load_preview().await?.is_none() {
            return Err(GroupingError::NoPendingPreview);
        }
        self.publish(run, StatusRecord::grouping("Naming groups...")).await?;

        let PendingPreview {
            window,
            host,
            groups,
            ..
        } = pending;

        let naming = self.name_groups(host, &groups).await;
        run.check()?;

        let record = StatusRecord {
            group_count: Some(groups.len()),
            ..StatusRecord::grouping("Creating groups...")
        };
        self.publish(run, record).await?;
        if !self.options.settle_delay.is_zero() {
            sleep(self.options.settle_delay).await;
        }

        let mut already_grouped: HashSet<TabId> = self
            .tabs
            .query_window(window, false)
            .await?
            .into_iter()
            .filter(Tab::is_grouped)
            .map(|t| t.id)
            .collect();
        debug!("{} tabs already in groups (skipping)", already_grouped.len());

        let mut created = Vec::new();
        let mut failed = Vec::new();
        for group in &groups {
            run.check()?;
            let label = naming
                .label(&group.domain)
                .map(str::to_string)
                .unwrap_or_else(|| crate::naming::fallback_label(&group.domain));
            let color = TabGroupColor::from_palette(created.len());

            match self
                .create_group(run, window, group, label, color, &already_grouped)
                .await?
            {
                GroupAttempt::Created(group) => {
                    info!(
                        "Created \"{}\" ({} tabs, group {})",
                        group.label, group.tab_count, group.group_id
                    );
                    already_grouped.extend(group.tab_ids.iter().copied());
                    created.push(group);
                    if !self.options.pacing_delay.is_zero() {
                        sleep(self.options.pacing_delay).await;
                    }
                }
                GroupAttempt::Failed(group) => {
                    warn!(domain = %group.domain, "Failed \"{}\": {}", group.label, group.reason);
                    failed.push(group);
                }
            }
        }

        if created.is_empty() {
            return Err(GroupingError::NoGroupsCreated {
                failed: failed.len(),
            });
        }

        let outcome = RunOutcome {
            run_id: run.id(),
            created,
            failed,
            naming,
        };
        self.status.clear_preview_for(run).await?;
        self.publish(
            run,
            StatusRecord::complete(outcome.summary(), outcome.details(), outcome.failed.len()),
        )
        .await?;
        info!(
            created = outcome.created.len(),
            failed = outcome.failed.len(),
            "Tab grouping complete"
        );
        Ok(outcome)
    }

    /// Ask the namer for labels. Never fails: errors degrade to fallbacks.
    async fn name_groups(&self, host: TabId, groups: &DomainGroups) -> NamingResponse {
        let request = NamingRequest::new(groups.summary()).with_debug(self.options.debug);
        debug!(host = %host, domains = request.domains.len(), "Requesting group names");

        match self.namer.name_groups(host, &request).await {
            Ok(response) => {
                let response = reconcile(&request, response, self.options.max_label_len);
                if let Some(notice) = &response.error {
                    info!("Naming notice: {}", notice);
                }
                response
            }
            Err(e) => {
                warn!(host = %host, "Naming delegate failed, using fallback names: {}", e);
                fallback_response(&request, e.to_string())
            }
        }
    }

    /// Re-validate one domain group and create it.
    ///
    /// Only cancellation is returned as an error; everything else becomes a
    /// [`FailedGroup`].
    async fn create_group(
        &self,
        run: &RunHandle,
        window: WindowId,
        group: &DomainGroup,
        label: String,
        color: TabGroupColor,
        already_grouped: &HashSet<TabId>,
    ) -> Result<GroupAttempt, GroupingError> {
        let min = self.partitioner.min_group_size();
        let failure = |reason: String| {
            GroupAttempt::Failed(FailedGroup {
                label: label.clone(),
                domain: group.domain.clone(),
                reason,
            })
        };

        let candidates: Vec<TabId> = group
            .tab_ids
            .iter()
            .copied()
            .filter(|id| !already_grouped.contains(id))
            .collect();
        if candidates.len() < min {
            debug!(
                domain = %group.domain,
                "Only {} ungrouped tabs left",
                candidates.len()
            );
            return Ok(failure(format!(
                "Insufficient tabs: {} ungrouped",
                candidates.len()
            )));
        }

        let mut valid = Vec::with_capacity(candidates.len());
        for id in candidates {
            match self.tabs.get_tab(id).await {
                Ok(tab) if self.still_groupable(&tab, window) => valid.push(id),
                Ok(_) => debug!(tab = %id, domain = %group.domain, "Tab changed, dropping"),
                Err(e) => debug!(tab = %id, domain = %group.domain, "Tab invalid: {}", e),
            }
        }
        if valid.len() < min {
            return Ok(failure(format!(
                "Insufficient valid tabs: {} of {}",
                valid.len(),
                group.len()
            )));
        }

        run.check()?;
        let grouped = self
            .options
            .retry
            .run("Group creation", || self.tabs.group_tabs(&valid), |_| true)
            .await;
        let group_id = match grouped {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    domain = %group.domain,
                    tabs = ?valid,
                    "Group creation failed: {}",
                    e
                );
                return Ok(failure(e.to_string()));
            }
        };

        let title = truncate_title(&label, self.options.max_title_len);
        let update = GroupUpdate::new(title.clone(), color);
        if let Err(e) = self
            .options
            .retry
            .run(
                "Group update",
                || self.tabs.update_group(group_id, update.clone()),
                |_| true,
            )
            .await
        {
            warn!(domain = %group.domain, group = %group_id, "Group label not applied: {}", e);
        }

        Ok(GroupAttempt::Created(CreatedGroup {
            label: title,
            domain: group.domain.clone(),
            tab_count: valid.len(),
            tab_ids: valid,
            group_id,
            color,
        }))
    }

    fn still_groupable(&self, tab: &Tab, window: WindowId) -> bool {
        !tab.pinned && !tab.is_grouped() && is_accessible(tab, window, self.options.allow_loading_tabs)
    }
}

fn truncate_title(label: &str, max: usize) -> String {
    let truncated: String = label.chars().take(max).collect();
    truncated.trim_end().to_string()
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
