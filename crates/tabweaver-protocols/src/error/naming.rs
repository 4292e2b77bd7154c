//! Delegated naming errors.

use thiserror::Error;

use super::BrowserError;

/// Failures of the naming round-trip itself.
///
/// These never abort a grouping run; callers degrade to fallback labels.
#[derive(Debug, Error)]
pub enum NamingError {
    #[error("Delegate execution failed: {0}")]
    Delegate(#[from] BrowserError),

    #[error("Malformed naming payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("No tab available to host naming")]
    NoHostTab,
}
