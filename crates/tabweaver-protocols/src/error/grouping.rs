//! Run-level grouping errors.

use thiserror::Error;

use super::{BrowserError, StoreError};

/// Conditions that end a grouping run.
///
/// The `Display` text of each variant is what gets published verbatim
/// in the `error` status record.
#[derive(Debug, Error)]
pub enum GroupingError {
    #[error("No browser window found.")]
    NoWindow,

    #[error("Need at least {required} accessible tabs.")]
    InsufficientTabs { found: usize, required: usize },

    #[error("No domain has at least {min_group_size} tabs to group.")]
    NoDomainGroups { min_group_size: usize },

    #[error("No groups created.")]
    NoGroupsCreated { failed: usize },

    #[error("No grouping preview is awaiting confirmation.")]
    NoPendingPreview,

    #[error("Grouping run was superseded")]
    Cancelled,

    #[error("{0}")]
    Browser(#[from] BrowserError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl GroupingError {
    /// Whether this is a silent exit rather than a failure to report.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GroupingError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_tabs_message() {
        let err = GroupingError::InsufficientTabs {
            found: 1,
            required: 2,
        };
        assert_eq!(err.to_string(), "Need at least 2 accessible tabs.");
    }

    #[test]
    fn test_no_window_message() {
        assert_eq!(GroupingError::NoWindow.to_string(), "No browser window found.");
    }

    #[test]
    fn test_browser_error_passthrough() {
        let err = GroupingError::from(BrowserError::NoActiveTab);
        assert_eq!(err.to_string(), "No active tab");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(GroupingError::Cancelled.is_cancelled());
        assert!(!GroupingError::NoWindow.is_cancelled());
    }
}
