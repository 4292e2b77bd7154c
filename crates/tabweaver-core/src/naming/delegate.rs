//! Naming delegated into a page context.
//!
//! The privileged controller cannot reach the language model itself. It
//! wraps the request in a [`NamingEnvelope`], ships it to a tab through a
//! [`ScriptHost`], and the page side answers with a serialized
//! [`NamingResponse`] produced by [`serve_naming_request`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use tabweaver_protocols::{
    GroupNamer, NamingError, NamingRequest, NamingResponse, ScriptHost, TabId,
};

use super::OracleNamer;

/// Action tag carried by every delegated naming message.
pub const NAMING_ACTION: &str = "execute_ai_naming";

/// Message sent across the execution boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingEnvelope {
    pub action: String,
    pub request: NamingRequest,
}

impl NamingEnvelope {
    pub fn new(request: NamingRequest) -> Self {
        Self {
            action: NAMING_ACTION.to_string(),
            request,
        }
    }
}

/// [`GroupNamer`] that runs the naming call inside the host tab.
pub struct DelegatingNamer {
    host: Arc<dyn ScriptHost>,
}

impl DelegatingNamer {
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl GroupNamer for DelegatingNamer {
    async fn name_groups(
        &self,
        host: TabId,
        request: &NamingRequest,
    ) -> Result<NamingResponse, NamingError> {
        let payload = serde_json::to_value(NamingEnvelope::new(request.clone()))?;
        debug!(tab = %host, domains = request.domains.len(), "Delegating naming to page context");

        let reply = self.host.execute(host, payload).await?;
        let response: NamingResponse = serde_json::from_value(reply)?;
        Ok(response)
    }
}

/// Page-side handler: decode an envelope, name the groups, encode the reply.
///
/// Naming failures are carried inside the response; only a malformed
/// envelope is an error.
pub async fn serve_naming_request(oracle: &OracleNamer, payload: Value) -> Result<Value, String> {
    let envelope: NamingEnvelope =
        serde_json::from_value(payload).map_err(|e| format!("Invalid naming request: {e}"))?;
    if envelope.action != NAMING_ACTION {
        return Err(format!("Unsupported action: {}", envelope.action));
    }

    let response = oracle.name(&envelope.request).await;
    serde_json::to_value(response).map_err(|e| e.to_string())
}
