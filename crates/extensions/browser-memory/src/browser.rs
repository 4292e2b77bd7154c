//! In-memory tabs and tab groups.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use tabweaver_protocols::{
    BrowserError, GroupId, GroupUpdate, Tab, TabGroupColor, TabId, TabsApi, WindowId,
};

/// A tab group as the browser holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRecord {
    pub id: GroupId,
    pub window_id: WindowId,
    pub title: Option<String>,
    pub color: Option<TabGroupColor>,
}

/// Mutating calls in the order they reached the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Group { tabs: Vec<TabId>, result: Result<GroupId, String> },
    Update { group: GroupId, update: GroupUpdate },
}

#[derive(Default)]
struct BrowserState {
    tabs: Vec<Tab>,
    groups: Vec<GroupRecord>,
    next_group: i64,
    /// Remaining forced failures for group calls containing the tab.
    group_failures: HashMap<TabId, u32>,
    update_failures: u32,
    mutations: Vec<Mutation>,
}

/// Browser simulation implementing [`TabsApi`].
///
/// Tabs keep insertion order, which is the order `query_window` reports.
pub struct MemoryBrowser {
    state: Mutex<BrowserState>,
    latency: Mutex<Duration>,
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BrowserState {
                next_group: 1,
                ..Default::default()
            }),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    /// Browser pre-populated with `tabs`. Existing group ids are registered.
    pub fn with_tabs(tabs: impl IntoIterator<Item = Tab>) -> Self {
        let browser = Self::new();
        for tab in tabs {
            browser.add_tab(tab);
        }
        browser
    }

    pub fn add_tab(&self, tab: Tab) {
        let mut state = self.state.lock();
        if let Some(group) = tab.group_id {
            if !state.groups.iter().any(|g| g.id == group) {
                state.groups.push(GroupRecord {
                    id: group,
                    window_id: tab.window_id,
                    title: None,
                    color: None,
                });
            }
            state.next_group = state.next_group.max(group.0 + 1);
        }
        state.tabs.push(tab);
    }

    /// Apply `f` to a live tab. Returns false if the tab does not exist.
    pub fn update_tab(&self, id: TabId, f: impl FnOnce(&mut Tab)) -> bool {
        let mut state = self.state.lock();
        match state.tabs.iter_mut().find(|t| t.id == id) {
            Some(tab) => {
                f(tab);
                true
            }
            None => false,
        }
    }

    pub fn close_tab(&self, id: TabId) -> bool {
        let mut state = self.state.lock();
        let before = state.tabs.len();
        state.tabs.retain(|t| t.id != id);
        state.tabs.len() != before
    }

    /// Make `id` the only active tab.
    pub fn activate(&self, id: TabId) {
        let mut state = self.state.lock();
        for tab in state.tabs.iter_mut() {
            tab.active = tab.id == id;
        }
    }

    pub fn tab(&self, id: TabId) -> Option<Tab> {
        self.state.lock().tabs.iter().find(|t| t.id == id).cloned()
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.lock().tabs.clone()
    }

    pub fn groups(&self) -> Vec<GroupRecord> {
        self.state.lock().groups.clone()
    }

    pub fn group(&self, id: GroupId) -> Option<GroupRecord> {
        self.state.lock().groups.iter().find(|g| g.id == id).cloned()
    }

    /// Tabs currently in `group`.
    pub fn group_members(&self, group: GroupId) -> Vec<TabId> {
        self.state
            .lock()
            .tabs
            .iter()
            .filter(|t| t.group_id == Some(group))
            .map(|t| t.id)
            .collect()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.lock().mutations.clone()
    }

    /// Number of `group_tabs` calls received, failed ones included.
    pub fn group_calls(&self) -> usize {
        self.state
            .lock()
            .mutations
            .iter()
            .filter(|m| matches!(m, Mutation::Group { .. }))
            .count()
    }

    /// Fail the next `times` group calls that include `tab`.
    pub fn fail_grouping_with(&self, tab: TabId, times: u32) {
        self.state.lock().group_failures.insert(tab, times);
    }

    /// Fail the next `times` group updates.
    pub fn fail_updates(&self, times: u32) {
        self.state.lock().update_failures = times;
    }

    /// Delay applied to every API call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl TabsApi for MemoryBrowser {
    async fn active_tab(&self) -> Result<Option<Tab>, BrowserError> {
        self.simulate_latency().await;
        Ok(self.state.lock().tabs.iter().find(|t| t.active).cloned())
    }

    async fn query_window(&self, window: WindowId, pinned: bool) -> Result<Vec<Tab>, BrowserError> {
        self.simulate_latency().await;
        Ok(self
            .state
            .lock()
            .tabs
            .iter()
            .filter(|t| t.window_id == window && t.pinned == pinned)
            .cloned()
            .collect())
    }

    async fn get_tab(&self, tab: TabId) -> Result<Tab, BrowserError> {
        self.simulate_latency().await;
        self.tab(tab).ok_or(BrowserError::TabNotFound(tab))
    }

    async fn group_tabs(&self, tabs: &[TabId]) -> Result<GroupId, BrowserError> {
        self.simulate_latency().await;
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let forced = tabs.iter().find_map(|id| {
            state
                .group_failures
                .get_mut(id)
                .filter(|remaining| **remaining > 0)
                .map(|remaining| {
                    *remaining -= 1;
                    *id
                })
        });
        if let Some(id) = forced {
            let message = format!("Tab {} cannot be grouped right now", id);
            state.mutations.push(Mutation::Group {
                tabs: tabs.to_vec(),
                result: Err(message.clone()),
            });
            return Err(BrowserError::GroupFailed(message));
        }

        let mut window = None;
        for id in tabs {
            let Some(tab) = state.tabs.iter().find(|t| t.id == *id) else {
                let message = format!("No tab with id: {}", id);
                state.mutations.push(Mutation::Group {
                    tabs: tabs.to_vec(),
                    result: Err(message.clone()),
                });
                return Err(BrowserError::GroupFailed(message));
            };
            window.get_or_insert(tab.window_id);
        }
        let Some(window_id) = window else {
            return Err(BrowserError::GroupFailed("No tabs given".to_string()));
        };

        let group = GroupId(state.next_group);
        state.next_group += 1;
        state.groups.push(GroupRecord {
            id: group,
            window_id,
            title: None,
            color: None,
        });
        for tab in state.tabs.iter_mut().filter(|t| tabs.contains(&t.id)) {
            tab.group_id = Some(group);
        }
        state.mutations.push(Mutation::Group {
            tabs: tabs.to_vec(),
            result: Ok(group),
        });
        debug!(group = %group, tabs = tabs.len(), "Created group");
        Ok(group)
    }

    async fn update_group(&self, group: GroupId, update: GroupUpdate) -> Result<(), BrowserError> {
        self.simulate_latency().await;
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.update_failures > 0 {
            state.update_failures -= 1;
            return Err(BrowserError::UpdateFailed(format!(
                "Group {} is busy",
                group
            )));
        }

        let record = state
            .groups
            .iter_mut()
            .find(|g| g.id == group)
            .ok_or(BrowserError::GroupNotFound(group))?;
        record.title = Some(update.title.clone());
        record.color = Some(update.color);
        state.mutations.push(Mutation::Update { group, update });
        Ok(())
    }
}
