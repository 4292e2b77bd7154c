//! On-device language model capability.

mod traits;

pub use traits::*;

use serde::{Deserialize, Serialize};

/// Result of an availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Ready to create sessions.
    Available,
    /// Usable once the model finishes downloading.
    Downloadable,
    /// Model download in progress.
    Downloading,
    /// Not supported on this system.
    Unavailable,
}

impl Availability {
    pub fn is_usable(&self) -> bool {
        !matches!(self, Availability::Unavailable)
    }
}

/// Sampling limits reported by the capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParams {
    pub default_temperature: f32,
    pub max_temperature: f32,
    pub default_top_k: u32,
    pub max_top_k: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            default_temperature: 1.0,
            max_temperature: 2.0,
            default_top_k: 3,
            max_top_k: 128,
        }
    }
}

/// Sampling options for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    pub temperature: f32,
    pub top_k: u32,
}

/// Receives model download progress as a fraction in `0.0..=1.0`.
pub type ProgressMonitor = Box<dyn Fn(f32) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_is_usable() {
        assert!(Availability::Available.is_usable());
        assert!(Availability::Downloadable.is_usable());
        assert!(Availability::Downloading.is_usable());
        assert!(!Availability::Unavailable.is_usable());
    }
}
