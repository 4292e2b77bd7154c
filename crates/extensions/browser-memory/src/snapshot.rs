//! Tab snapshot files.
//!
//! A snapshot is either a JSON array of tabs or an object with a `tabs`
//! array. When no tab is marked active the first one is.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use tabweaver_protocols::Tab;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Bare(Vec<Tab>),
    Wrapped { tabs: Vec<Tab> },
}

/// Parse snapshot text into tabs.
pub fn parse_snapshot(content: &str) -> Result<Vec<Tab>, SnapshotError> {
    let file: SnapshotFile = serde_json::from_str(content)?;
    let mut tabs = match file {
        SnapshotFile::Bare(tabs) | SnapshotFile::Wrapped { tabs } => tabs,
    };
    if !tabs.iter().any(|t| t.active) {
        if let Some(first) = tabs.first_mut() {
            first.active = true;
        }
    }
    Ok(tabs)
}

/// Read and parse a snapshot file.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<Tab>, SnapshotError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_snapshot(&content)
}
