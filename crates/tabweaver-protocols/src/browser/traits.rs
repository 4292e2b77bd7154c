//! Browser trait definitions.

use async_trait::async_trait;

use super::GroupUpdate;
use crate::error::BrowserError;
use crate::types::{GroupId, Tab, TabId, WindowId};

/// Tab and tab-group primitives exposed by the browser.
///
/// Every method is a suspension point and may fail; callers treat them as
/// retryable.
#[async_trait]
pub trait TabsApi: Send + Sync {
    /// The active tab of the focused window.
    async fn active_tab(&self) -> Result<Option<Tab>, BrowserError>;

    /// Tabs in `window` whose pinned flag equals `pinned`.
    async fn query_window(&self, window: WindowId, pinned: bool) -> Result<Vec<Tab>, BrowserError>;

    /// Live state of a single tab.
    async fn get_tab(&self, tab: TabId) -> Result<Tab, BrowserError>;

    /// Move `tabs` into a new group and return its id.
    async fn group_tabs(&self, tabs: &[TabId]) -> Result<GroupId, BrowserError>;

    /// Apply title and color to an existing group.
    async fn update_group(&self, group: GroupId, update: GroupUpdate) -> Result<(), BrowserError>;
}

/// Runs a marshalled request inside a tab's page context.
///
/// Some capabilities are only reachable from page contexts, so the
/// privileged side serializes a request, ships it to a tab and awaits the
/// serialized reply. The call is one-shot; a tab that closes or navigates
/// mid-call yields an error.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    async fn execute(
        &self,
        tab: TabId,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, BrowserError>;
}
