//! Orchestrator tuning.

use std::time::Duration;

use tabweaver_config::Config;

use crate::naming::MAX_LABEL_LEN;
use crate::partition::{MIN_GROUP_SIZE, PartitionStrategy};
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorOptions {
    pub min_group_size: usize,
    pub strategy: PartitionStrategy,
    /// Accept tabs that are still loading.
    pub allow_loading_tabs: bool,
    /// Pause after each created group.
    pub pacing_delay: Duration,
    /// Pause after publishing the `grouping` status.
    pub settle_delay: Duration,
    pub max_title_len: usize,
    pub max_label_len: usize,
    pub retry: RetryPolicy,
    /// Forwarded to the naming call.
    pub debug: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            min_group_size: MIN_GROUP_SIZE,
            strategy: PartitionStrategy::Hostname,
            allow_loading_tabs: false,
            pacing_delay: Duration::from_millis(50),
            settle_delay: Duration::ZERO,
            max_title_len: MAX_LABEL_LEN,
            max_label_len: MAX_LABEL_LEN,
            retry: RetryPolicy::default(),
            debug: false,
        }
    }
}

impl OrchestratorOptions {
    pub fn from_config(config: &Config) -> Self {
        let grouping = &config.grouping;
        Self {
            min_group_size: grouping.min_group_size.max(MIN_GROUP_SIZE),
            strategy: grouping.strategy.into(),
            allow_loading_tabs: grouping.allow_loading_tabs,
            pacing_delay: Duration::from_millis(grouping.pacing_delay_ms),
            settle_delay: Duration::from_millis(grouping.settle_delay_ms),
            max_title_len: grouping.max_title_len.clamp(1, MAX_LABEL_LEN),
            max_label_len: config.naming.max_label_len.min(MAX_LABEL_LEN),
            retry: RetryPolicy::from(&grouping.retry),
            debug: config.debug_mode,
        }
    }

    /// No pauses at all. Handy for tests and replays.
    pub fn without_delays(mut self) -> Self {
        self.pacing_delay = Duration::ZERO;
        self.settle_delay = Duration::ZERO;
        self.retry.delay = Duration::ZERO;
        self
    }
}
