//! Run results.

use std::fmt::Write;

use uuid::Uuid;

use tabweaver_protocols::{GroupId, NamingResponse, TabGroupColor, TabId, WindowId};

use crate::partition::DomainGroups;
use crate::status::GroupDetail;

/// A tab group the run created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedGroup {
    pub label: String,
    pub domain: String,
    pub tab_count: usize,
    pub tab_ids: Vec<TabId>,
    pub group_id: GroupId,
    pub color: TabGroupColor,
}

/// A domain group the run could not create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedGroup {
    pub label: String,
    pub domain: String,
    pub reason: String,
}

/// Result of `begin`: the partition awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub run_id: Uuid,
    pub window_id: WindowId,
    pub groups: DomainGroups,
}

/// Result of a confirmed run that created at least one group.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub created: Vec<CreatedGroup>,
    pub failed: Vec<FailedGroup>,
    pub naming: NamingResponse,
}

impl RunOutcome {
    pub fn details(&self) -> Vec<GroupDetail> {
        self.created
            .iter()
            .map(|g| GroupDetail {
                name: g.label.clone(),
                tab_count: g.tab_count,
            })
            .collect()
    }

    /// User-facing summary for the `complete` status.
    pub fn summary(&self) -> String {
        summary_message(&self.created, self.failed.len())
    }
}

pub(crate) fn summary_message(created: &[CreatedGroup], failed: usize) -> String {
    let noun = if created.len() == 1 { "group" } else { "groups" };
    let mut message = format!("Created {} {}:\n", created.len(), noun);
    for group in created {
        let _ = write!(message, "\n- {} ({} tabs)", group.label, group.tab_count);
    }
    if failed > 0 {
        let _ = write!(
            message,
            "\n\n{} group{} could not be created.",
            failed,
            if failed == 1 { "" } else { "s" }
        );
    }
    message
}
