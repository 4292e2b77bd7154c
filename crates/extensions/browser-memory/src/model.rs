//! Language model with scripted behaviour.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use tabweaver_protocols::{
    Availability, LanguageModel, LanguageModelError, LanguageModelSession, ModelParams,
    ProgressMonitor, SessionOptions,
};

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    destroyed: AtomicUsize,
}

/// A [`LanguageModel`] that replies with a canned response.
pub struct ScriptedLanguageModel {
    availability: Availability,
    params: ModelParams,
    response: Result<String, String>,
    fail_session: Option<String>,
    counters: Arc<Counters>,
    prompts: Arc<Mutex<Vec<String>>>,
    last_options: Mutex<Option<SessionOptions>>,
}

impl ScriptedLanguageModel {
    /// Available model answering every prompt with `response`.
    pub fn replying(response: impl Into<String>) -> Self {
        Self {
            availability: Availability::Available,
            params: ModelParams::default(),
            response: Ok(response.into()),
            fail_session: None,
            counters: Arc::new(Counters::default()),
            prompts: Arc::new(Mutex::new(Vec::new())),
            last_options: Mutex::new(None),
        }
    }

    /// Model reporting itself unavailable.
    pub fn unavailable() -> Self {
        Self {
            availability: Availability::Unavailable,
            ..Self::replying("")
        }
    }

    /// Model whose prompts fail with `message`.
    pub fn failing_prompt(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            ..Self::replying("")
        }
    }

    /// Model whose session creation fails with `message`.
    pub fn failing_session(message: impl Into<String>) -> Self {
        Self {
            fail_session: Some(message.into()),
            ..Self::replying("")
        }
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    pub fn sessions_created(&self) -> usize {
        self.counters.created.load(Ordering::SeqCst)
    }

    pub fn sessions_destroyed(&self) -> usize {
        self.counters.destroyed.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_options(&self) -> Option<SessionOptions> {
        *self.last_options.lock()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn availability(&self) -> Result<Availability, LanguageModelError> {
        Ok(self.availability)
    }

    async fn params(&self) -> Result<ModelParams, LanguageModelError> {
        Ok(self.params)
    }

    async fn create_session(
        &self,
        options: SessionOptions,
        monitor: Option<ProgressMonitor>,
    ) -> Result<Box<dyn LanguageModelSession>, LanguageModelError> {
        if let Some(message) = &self.fail_session {
            return Err(LanguageModelError::SessionFailed(message.clone()));
        }
        if let Some(monitor) = monitor {
            if matches!(
                self.availability,
                Availability::Downloadable | Availability::Downloading
            ) {
                monitor(0.0);
                monitor(1.0);
            }
        }

        *self.last_options.lock() = Some(options);
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            response: self.response.clone(),
            destroyed: AtomicBool::new(false),
            counters: self.counters.clone(),
            prompts: self.prompts.clone(),
        }))
    }
}

struct ScriptedSession {
    response: Result<String, String>,
    destroyed: AtomicBool,
    counters: Arc<Counters>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LanguageModelSession for ScriptedSession {
    async fn prompt(&self, input: &str) -> Result<String, LanguageModelError> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(LanguageModelError::Destroyed);
        }
        self.prompts.lock().push(input.to_string());
        self.response
            .clone()
            .map_err(LanguageModelError::PromptFailed)
    }

    async fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SessionOptions {
        SessionOptions {
            temperature: 0.3,
            top_k: 10,
        }
    }

    #[tokio::test]
    async fn test_replying_session() {
        let model = ScriptedLanguageModel::replying("a.com|Alpha");
        let session = model.create_session(options(), None).await.unwrap();
        assert_eq!(session.prompt("hi").await.unwrap(), "a.com|Alpha");
        session.destroy().await;
        session.destroy().await;

        assert_eq!(model.sessions_created(), 1);
        assert_eq!(model.sessions_destroyed(), 1);
        assert_eq!(model.prompts(), vec!["hi".to_string()]);
        assert_eq!(model.last_options(), Some(options()));
    }

    #[tokio::test]
    async fn test_prompt_after_destroy() {
        let model = ScriptedLanguageModel::replying("x");
        let session = model.create_session(options(), None).await.unwrap();
        session.destroy().await;
        assert!(matches!(
            session.prompt("hi").await,
            Err(LanguageModelError::Destroyed)
        ));
    }

    #[tokio::test]
    async fn test_failing_session() {
        let model = ScriptedLanguageModel::failing_session("no memory");
        let result = model.create_session(options(), None).await;
        assert!(matches!(result, Err(LanguageModelError::SessionFailed(_))));
        assert_eq!(model.sessions_created(), 0);
    }

    #[tokio::test]
    async fn test_download_progress_reported() {
        let model = ScriptedLanguageModel::replying("x").with_availability(Availability::Downloadable);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let monitor: ProgressMonitor = Box::new(move |p| sink.lock().push(p));
        model.create_session(options(), Some(monitor)).await.unwrap();
        assert_eq!(*seen.lock(), vec![0.0, 1.0]);
    }
}
