//! In-process namers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use tabweaver_protocols::{
    BrowserError, GroupNamer, NamingError, NamingRequest, NamingResponse, TabId,
};

/// Answers from a fixed domain -> label table.
///
/// Unknown domains are left out of the response, exactly like an oracle
/// that skipped them.
#[derive(Debug, Default)]
pub struct StaticNamer {
    labels: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, domain: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(domain.into(), label.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroupNamer for StaticNamer {
    async fn name_groups(
        &self,
        _host: TabId,
        request: &NamingRequest,
    ) -> Result<NamingResponse, NamingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let named_groups = request
            .domain_names()
            .filter_map(|domain| {
                self.labels
                    .get(domain)
                    .map(|label| (domain.to_string(), label.clone()))
            })
            .collect();
        Ok(NamingResponse {
            named_groups,
            error: None,
            ai_generated: Some(true),
            using_fallback: Some(false),
        })
    }
}

/// Always fails as if the host tab went away mid-call.
#[derive(Debug, Default)]
pub struct FailingNamer;

#[async_trait]
impl GroupNamer for FailingNamer {
    async fn name_groups(
        &self,
        host: TabId,
        _request: &NamingRequest,
    ) -> Result<NamingResponse, NamingError> {
        Err(NamingError::Delegate(BrowserError::ScriptFailed {
            tab: host,
            message: "tab closed".to_string(),
        }))
    }
}
