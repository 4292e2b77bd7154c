//! Language model trait definitions.

use async_trait::async_trait;

use super::{Availability, ModelParams, ProgressMonitor, SessionOptions};
use crate::error::LanguageModelError;

/// Text-completion capability with availability/session/prompt/destroy
/// semantics.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn availability(&self) -> Result<Availability, LanguageModelError>;

    async fn params(&self) -> Result<ModelParams, LanguageModelError>;

    async fn create_session(
        &self,
        options: SessionOptions,
        monitor: Option<ProgressMonitor>,
    ) -> Result<Box<dyn LanguageModelSession>, LanguageModelError>;
}

/// A live model session. Must be destroyed after use.
#[async_trait]
pub trait LanguageModelSession: Send + Sync {
    async fn prompt(&self, input: &str) -> Result<String, LanguageModelError>;

    /// Release the session. Idempotent.
    async fn destroy(&self);
}
