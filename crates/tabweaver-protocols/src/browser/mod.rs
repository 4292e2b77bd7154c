//! Browser tab/group surface.

mod traits;

pub use traits::*;

use serde::{Deserialize, Serialize};

use crate::types::TabGroupColor;

/// Properties applied to a tab group after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUpdate {
    pub title: String,
    pub color: TabGroupColor,
}

impl GroupUpdate {
    pub fn new(title: impl Into<String>, color: TabGroupColor) -> Self {
        Self {
            title: title.into(),
            color,
        }
    }
}
