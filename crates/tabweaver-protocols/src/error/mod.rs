//! Error types for the Tabweaver protocol layer.

mod browser;
mod grouping;
mod language_model;
mod naming;
mod store;

pub use browser::*;
pub use grouping::*;
pub use language_model::*;
pub use naming::*;
pub use store::*;
