//! Common types used across the Tabweaver engine.

mod tab;

pub use tab::*;

#[cfg(test)]
#[path = "tab_tests.rs"]
mod tests;
