//! Domain partitioning.
//!
//! Buckets accessible tabs by normalized domain. Pure: no I/O, no failure
//! modes beyond unparseable URLs, which are skipped with a warning.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::{debug, warn};
use url::Url;

use tabweaver_config::PartitionStrategyConfig;
use tabweaver_protocols::{DomainCount, LoadStatus, Tab, TabId, WindowId};

/// Smallest group worth creating.
pub const MIN_GROUP_SIZE: usize = 2;

/// Second-level suffixes under which registrations sit one label deeper.
static TWO_LEVEL_TLDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "co.jp", "ne.jp", "or.jp", "com.au",
        "net.au", "org.au", "edu.au", "co.nz", "org.nz", "com.br", "com.cn", "com.mx", "com.tr",
        "co.in", "co.kr", "co.za", "com.sg", "com.hk", "com.tw",
    ]
});

/// How a hostname becomes a grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Lower-cased hostname, as parsed.
    #[default]
    Hostname,
    /// Registrable domain: `docs.github.com` and `github.com` share a key.
    MainDomain,
}

impl From<PartitionStrategyConfig> for PartitionStrategy {
    fn from(config: PartitionStrategyConfig) -> Self {
        match config {
            PartitionStrategyConfig::Hostname => PartitionStrategy::Hostname,
            PartitionStrategyConfig::MainDomain => PartitionStrategy::MainDomain,
        }
    }
}

/// Tabs sharing a domain, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainGroup {
    pub domain: String,
    pub tab_ids: Vec<TabId>,
    pub urls: Vec<String>,
}

impl DomainGroup {
    fn new(domain: String) -> Self {
        Self {
            domain,
            tab_ids: Vec::new(),
            urls: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tab_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tab_ids.is_empty()
    }
}

/// Ordered partition result. Domains keep the order of their first tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainGroups {
    groups: Vec<DomainGroup>,
}

impl DomainGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DomainGroup> {
        self.groups.iter()
    }

    pub fn get(&self, domain: &str) -> Option<&DomainGroup> {
        self.groups.iter().find(|g| g.domain == domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.domain.as_str())
    }

    /// Total tabs across all groups.
    pub fn tab_count(&self) -> usize {
        self.groups.iter().map(DomainGroup::len).sum()
    }

    /// Domain summary for the naming call.
    pub fn summary(&self) -> Vec<DomainCount> {
        self.groups
            .iter()
            .map(|g| DomainCount::new(g.domain.clone(), g.len()))
            .collect()
    }
}

impl IntoIterator for DomainGroups {
    type Item = DomainGroup;
    type IntoIter = std::vec::IntoIter<DomainGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'a> IntoIterator for &'a DomainGroups {
    type Item = &'a DomainGroup;
    type IntoIter = std::slice::Iter<'a, DomainGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Groups tabs by domain and drops undersized groups.
#[derive(Debug, Clone)]
pub struct DomainPartitioner {
    strategy: PartitionStrategy,
    min_group_size: usize,
}

impl Default for DomainPartitioner {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPartitioner {
    pub fn new() -> Self {
        Self {
            strategy: PartitionStrategy::Hostname,
            min_group_size: MIN_GROUP_SIZE,
        }
    }

    pub fn with_strategy(mut self, strategy: PartitionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Minimum tabs per group; values below 2 are raised to 2.
    pub fn with_min_group_size(mut self, min_group_size: usize) -> Self {
        self.min_group_size = min_group_size.max(MIN_GROUP_SIZE);
        self
    }

    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }

    /// Partition `tabs` by domain key.
    pub fn partition(&self, tabs: &[Tab]) -> DomainGroups {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut buckets: Vec<DomainGroup> = Vec::new();

        for tab in tabs {
            let Some(url) = tab.url.as_deref() else {
                continue;
            };
            let Some(domain) = domain_key(url, self.strategy) else {
                warn!(tab = %tab.id, url, "Could not parse tab URL, skipping");
                continue;
            };

            let slot = *index.entry(domain.clone()).or_insert_with(|| {
                buckets.push(DomainGroup::new(domain));
                buckets.len() - 1
            });
            let bucket = &mut buckets[slot];
            // A tab id is only ever counted once.
            if !bucket.tab_ids.contains(&tab.id) {
                bucket.tab_ids.push(tab.id);
                bucket.urls.push(url.to_string());
            }
        }

        let groups = buckets
            .into_iter()
            .filter(|group| {
                let keep = group.len() >= self.min_group_size;
                if keep {
                    debug!(domain = %group.domain, tabs = group.len(), "Domain group");
                } else {
                    debug!(
                        domain = %group.domain,
                        tabs = group.len(),
                        "Excluding domain below minimum group size"
                    );
                }
                keep
            })
            .collect::<Vec<_>>();

        debug!("Final domain groups: {}", groups.len());
        DomainGroups { groups }
    }
}

/// Grouping key for `url`, or `None` if it cannot be parsed or has no host.
pub fn domain_key(url: &str, strategy: PartitionStrategy) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_lowercase();
    if host.is_empty() {
        return None;
    }
    Some(match strategy {
        PartitionStrategy::Hostname => host,
        PartitionStrategy::MainDomain => main_domain(&host),
    })
}

/// Collapse a hostname to its registrable domain.
pub fn main_domain(host: &str) -> String {
    // IP literals have no registrable part.
    if host.parse::<std::net::IpAddr>().is_ok() || host.starts_with('[') {
        return host.to_string();
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if TWO_LEVEL_TLDS.contains(&last_two.as_str()) {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}

/// Whether a URL uses a scheme the grouping engine may touch.
pub fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Whether `tab` is a grouping candidate in `window`.
///
/// Only http(s) pages qualify: internal pages, extension pages and local
/// files can neither host the naming call nor be safely regrouped.
pub fn is_accessible(tab: &Tab, window: WindowId, allow_loading: bool) -> bool {
    let Some(url) = tab.url.as_deref() else {
        return false;
    };
    if !is_web_url(url) {
        return false;
    }
    if tab.discarded || tab.window_id != window {
        return false;
    }
    match tab.status {
        LoadStatus::Complete => true,
        LoadStatus::Loading => allow_loading,
    }
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
