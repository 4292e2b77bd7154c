//! # Tabweaver Core
//!
//! The tab grouping engine.
//!
//! ## Flow
//!
//! ```text
//! begin ──► analyzing ──► preview ──confirm──► grouping ──► complete | error
//!                            │
//!                            └──cancel──► idle
//! ```
//!
//! - [`partition`] buckets accessible tabs by domain.
//! - [`naming`] asks the on-device model for a label per domain and
//!   guarantees a deterministic fallback for every domain it cannot name.
//! - [`orchestrator`] owns the run lifecycle, re-validates tabs right before
//!   mutating them and records per-group success or failure.
//! - [`status`] is the persisted channel the UI observes.
//!
//! At most one run is active at a time; a newer `begin` cancels the older
//! run, which exits without writing any further status.

pub mod naming;
pub mod orchestrator;
pub mod partition;
pub mod retry;
pub mod run;
pub mod status;

pub use naming::{DelegatingNamer, NamingOptions, OracleNamer};
pub use orchestrator::{
    CreatedGroup, FailedGroup, GroupingOrchestrator, OrchestratorOptions, PreviewOutcome,
    RunOutcome,
};
pub use partition::{DomainGroup, DomainGroups, DomainPartitioner, PartitionStrategy};
pub use retry::RetryPolicy;
pub use run::{RunHandle, RunManager};
pub use status::{StatusKind, StatusRecord, StatusStore, StatusWatcher};
