//! In-memory browser surfaces for Tabweaver.
//!
//! Everything the grouping engine talks to, implemented in process:
//!
//! - [`MemoryBrowser`] - tabs, windows and tab groups, with failure injection
//! - [`MemoryStore`] - observable key-value storage
//! - [`ScriptedLanguageModel`] - a language model with canned behaviour
//! - [`PageScriptHost`] - runs page-side handlers on a separate task,
//!   reached only through serialized messages
//!
//! Used by the CLI to replay tab snapshots and by the engine's tests.

mod browser;
mod host;
mod model;
mod snapshot;
mod store;

pub use browser::{GroupRecord, MemoryBrowser, Mutation};
pub use host::{PageHandler, PageScriptHost};
pub use model::ScriptedLanguageModel;
pub use snapshot::{SnapshotError, load_snapshot, parse_snapshot};
pub use store::MemoryStore;
