//! Naming oracle over the on-device language model.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use tabweaver_config::NamingConfig;
use tabweaver_protocols::{
    GroupNamer, LanguageModel, LanguageModelError, NamingError, NamingRequest,
    NamingResponse, ProgressMonitor, SessionOptions, TabId,
};

use super::{MAX_LABEL_LEN, build_prompt, fallback_label, parse_labels};

/// Sampling caps and label limits for the naming oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamingOptions {
    /// Upper bound for temperature; favours consistent formatting.
    pub temperature_cap: f32,
    /// Upper bound for top-k.
    pub top_k_cap: u32,
    pub max_label_len: usize,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            temperature_cap: 0.5,
            top_k_cap: 30,
            max_label_len: MAX_LABEL_LEN,
        }
    }
}

impl From<&NamingConfig> for NamingOptions {
    fn from(config: &NamingConfig) -> Self {
        Self {
            temperature_cap: config.temperature_cap,
            top_k_cap: config.top_k_cap,
            max_label_len: config.max_label_len.min(MAX_LABEL_LEN),
        }
    }
}

/// Asks the language model for group labels.
///
/// Never fails: unavailability, session or prompt errors and unusable output
/// all degrade to fallback labels with a notice in
/// [`NamingResponse::error`].
pub struct OracleNamer {
    model: Arc<dyn LanguageModel>,
    options: NamingOptions,
}

impl OracleNamer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            options: NamingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: NamingOptions) -> Self {
        self.options = options;
        self
    }

    /// Name every domain in `request`.
    pub async fn name(&self, request: &NamingRequest) -> NamingResponse {
        if request.domains.is_empty() {
            return NamingResponse {
                ai_generated: Some(false),
                using_fallback: Some(false),
                ..Default::default()
            };
        }

        let (labels, notice) = match self.consult(request).await {
            Ok(parsed) => {
                for diagnostic in &parsed.diagnostics {
                    debug!(
                        line = diagnostic.line_no,
                        text = %diagnostic.line,
                        "Skipping response line: {}",
                        diagnostic.reason
                    );
                }
                let notice = parsed
                    .is_empty()
                    .then(|| "No valid group names in model response".to_string());
                (parsed.labels, notice)
            }
            Err(e) => {
                warn!("AI naming failed, using fallback names: {}", e);
                let notice = match e {
                    LanguageModelError::Unavailable(message) => message,
                    other => other.to_string(),
                };
                (Default::default(), Some(notice))
            }
        };

        let mut ai_count = 0usize;
        let mut fallback_count = 0usize;
        let named_groups = request
            .domain_names()
            .map(|domain| {
                let label = match labels.get(domain) {
                    Some(label) => {
                        ai_count += 1;
                        label.clone()
                    }
                    None => {
                        fallback_count += 1;
                        fallback_label(domain)
                    }
                };
                (domain.to_string(), label)
            })
            .collect();

        info!(
            "Named {} groups ({} by model, {} fallback)",
            request.domains.len(),
            ai_count,
            fallback_count
        );

        NamingResponse {
            named_groups,
            error: notice,
            ai_generated: Some(ai_count > 0),
            using_fallback: Some(fallback_count > 0),
        }
    }

    /// One availability check, one session, one prompt.
    async fn consult(
        &self,
        request: &NamingRequest,
    ) -> Result<super::ParsedLabels, LanguageModelError> {
        let availability = self.model.availability().await?;
        debug!("Language model availability: {:?}", availability);
        if !availability.is_usable() {
            return Err(LanguageModelError::Unavailable(
                "AI model not available on this system.".to_string(),
            ));
        }

        let params = self.model.params().await?;
        let options = SessionOptions {
            temperature: self.options.temperature_cap.min(params.max_temperature),
            top_k: self.options.top_k_cap.min(params.max_top_k),
        };

        let monitor: ProgressMonitor = Box::new(|fraction: f32| {
            debug!("Model download: {}%", (fraction * 100.0).round());
        });
        let session = self.model.create_session(options, Some(monitor)).await?;
        debug!(
            "Session ready (temperature={}, top_k={})",
            options.temperature, options.top_k
        );

        let prompt = build_prompt(&request.domains);
        let result = session.prompt(&prompt).await;
        session.destroy().await;
        let response = result?;

        if request.debug {
            debug!("Raw model response:\n{}", response);
        }

        Ok(parse_labels(
            &response,
            request.domain_names(),
            self.options.max_label_len,
        ))
    }
}

#[async_trait]
impl GroupNamer for OracleNamer {
    async fn name_groups(
        &self,
        _host: TabId,
        request: &NamingRequest,
    ) -> Result<NamingResponse, NamingError> {
        Ok(self.name(request).await)
    }
}
