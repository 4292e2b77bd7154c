//! # Tabweaver Protocols
//!
//! Core protocol definitions (traits) for the Tabweaver grouping engine.
//! Contains only interface definitions and wire types - no implementations.
//!
//! ## Core Traits
//!
//! - [`TabsApi`] - Browser tab and tab-group surface
//! - [`ScriptHost`] - Executes a marshalled request inside a tab's page context
//! - [`LanguageModel`] - On-device text generation capability
//! - [`KeyValueStore`] - Persisted, observable key-value channel
//! - [`GroupNamer`] - Produces a label for every domain group

pub mod browser;
pub mod error;
pub mod language_model;
pub mod naming;
pub mod store;
pub mod types;

// Re-export core traits
pub use browser::{GroupUpdate, ScriptHost, TabsApi};
pub use language_model::{
    Availability, LanguageModel, LanguageModelSession, ModelParams, ProgressMonitor,
    SessionOptions,
};
pub use naming::{DomainCount, GroupNamer, NamingRequest, NamingResponse};
pub use store::{KeyValueStore, StoreEvent};
pub use error::{BrowserError, GroupingError, LanguageModelError, NamingError, StoreError};
pub use types::*;
