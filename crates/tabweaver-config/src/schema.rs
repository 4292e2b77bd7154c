//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Verbose logging on both sides of the naming call.
    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default)]
    pub grouping: GroupingConfig,

    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub status: StatusConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How tabs are bucketed into domain groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategyConfig {
    /// Lower-cased hostname as parsed.
    #[default]
    Hostname,
    /// Registrable domain, collapsing subdomains.
    MainDomain,
}

/// Grouping run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,

    #[serde(default)]
    pub strategy: PartitionStrategyConfig,

    /// Treat tabs that are still loading as accessible.
    #[serde(default)]
    pub allow_loading_tabs: bool,

    /// Pause between consecutive group creations.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Pause after publishing the `grouping` status, before mutating.
    #[serde(default)]
    pub settle_delay_ms: u64,

    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_min_group_size() -> usize {
    2
}

fn default_pacing_delay_ms() -> u64 {
    50
}

fn default_max_title_len() -> usize {
    50
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_group_size: default_min_group_size(),
            strategy: PartitionStrategyConfig::default(),
            allow_loading_tabs: false,
            pacing_delay_ms: default_pacing_delay_ms(),
            settle_delay_ms: 0,
            max_title_len: default_max_title_len(),
            retry: RetryConfig::default(),
        }
    }
}

/// Group-creation retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Naming oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_temperature_cap")]
    pub temperature_cap: f32,

    #[serde(default = "default_top_k_cap")]
    pub top_k_cap: u32,

    #[serde(default = "default_max_label_len")]
    pub max_label_len: usize,
}

fn default_temperature_cap() -> f32 {
    0.5
}

fn default_top_k_cap() -> u32 {
    30
}

fn default_max_label_len() -> usize {
    50
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            temperature_cap: default_temperature_cap(),
            top_k_cap: default_top_k_cap(),
            max_label_len: default_max_label_len(),
        }
    }
}

/// Status channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Records older than this are discarded by readers.
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,

    /// How long a UI-side waiter keeps waiting for a result.
    #[serde(default = "default_ui_timeout_secs")]
    pub ui_timeout_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_freshness_secs() -> u64 {
    30
}

fn default_ui_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    300
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            freshness_secs: default_freshness_secs(),
            ui_timeout_secs: default_ui_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: String,

    /// Also write daily-rolling log files into `dir`.
    #[serde(default)]
    pub file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.tabweaver/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            file: false,
        }
    }
}
