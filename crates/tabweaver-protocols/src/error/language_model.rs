//! On-device language model errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LanguageModelError {
    #[error("Language model not available: {0}")]
    Unavailable(String),

    #[error("Session creation failed: {0}")]
    SessionFailed(String),

    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    #[error("Session already destroyed")]
    Destroyed,
}
