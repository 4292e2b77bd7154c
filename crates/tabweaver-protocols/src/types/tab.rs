//! Browser tab model.

use serde::{Deserialize, Serialize};

macro_rules! browser_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

browser_id!(
    /// Browser-assigned tab identifier.
    TabId
);
browser_id!(
    /// Browser-assigned window identifier.
    WindowId
);
browser_id!(
    /// Browser-assigned tab group identifier.
    GroupId
);

/// Tab load status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loading,
    #[default]
    Complete,
}

/// A live browser tab as reported by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub discarded: bool,
    #[serde(default)]
    pub status: LoadStatus,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub active: bool,
}

impl Tab {
    pub fn new(id: i64, window_id: i64, url: impl Into<String>) -> Self {
        Self {
            id: TabId(id),
            window_id: WindowId(window_id),
            url: Some(url.into()),
            pinned: false,
            discarded: false,
            status: LoadStatus::Complete,
            group_id: None,
            active: false,
        }
    }

    /// Whether the tab already belongs to a browser-managed group.
    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn discarded(mut self, discarded: bool) -> Self {
        self.discarded = discarded;
        self
    }

    pub fn with_status(mut self, status: LoadStatus) -> Self {
        self.status = status;
        self
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.group_id = Some(group);
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Tab group colors understood by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabGroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl TabGroupColor {
    /// Round-robin palette for newly created groups.
    pub const PALETTE: [TabGroupColor; 7] = [
        TabGroupColor::Blue,
        TabGroupColor::Red,
        TabGroupColor::Green,
        TabGroupColor::Yellow,
        TabGroupColor::Pink,
        TabGroupColor::Purple,
        TabGroupColor::Cyan,
    ];

    /// Palette color for the `index`-th created group.
    pub fn from_palette(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabGroupColor::Grey => "grey",
            TabGroupColor::Blue => "blue",
            TabGroupColor::Red => "red",
            TabGroupColor::Yellow => "yellow",
            TabGroupColor::Green => "green",
            TabGroupColor::Pink => "pink",
            TabGroupColor::Purple => "purple",
            TabGroupColor::Cyan => "cyan",
            TabGroupColor::Orange => "orange",
        }
    }
}

impl std::fmt::Display for TabGroupColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
