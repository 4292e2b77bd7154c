//! Browser tab/group API errors.

use thiserror::Error;

use crate::types::{GroupId, TabId, WindowId};

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("No tab with id: {0}")]
    TabNotFound(TabId),

    #[error("No window with id: {0}")]
    WindowNotFound(WindowId),

    #[error("No group with id: {0}")]
    GroupNotFound(GroupId),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Grouping tabs failed: {0}")]
    GroupFailed(String),

    #[error("Updating group failed: {0}")]
    UpdateFailed(String),

    #[error("Script execution failed in tab {tab}: {message}")]
    ScriptFailed { tab: TabId, message: String },

    #[error("Browser connection lost")]
    Disconnected,
}
