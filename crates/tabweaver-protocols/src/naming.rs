//! Group naming protocol.
//!
//! The request/response pair is the wire shape of the delegated naming
//! call: it crosses from the privileged controller into a page context as
//! JSON and comes back the same way.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NamingError;
use crate::types::TabId;

/// A domain and how many tabs it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCount {
    pub domain: String,
    pub tab_count: usize,
}

impl DomainCount {
    pub fn new(domain: impl Into<String>, tab_count: usize) -> Self {
        Self {
            domain: domain.into(),
            tab_count,
        }
    }
}

/// Naming request, domains in partition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingRequest {
    pub domains: Vec<DomainCount>,
    #[serde(default)]
    pub debug: bool,
}

impl NamingRequest {
    pub fn new(domains: Vec<DomainCount>) -> Self {
        Self {
            domains,
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Requested domain names, in order.
    pub fn domain_names(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.domain.as_str())
    }
}

/// Naming response: one label per requested domain plus a non-fatal notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingResponse {
    pub named_groups: BTreeMap<String, String>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_generated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using_fallback: Option<bool>,
}

impl NamingResponse {
    pub fn label(&self, domain: &str) -> Option<&str> {
        self.named_groups.get(domain).map(String::as_str)
    }
}

/// Produces labels for domain groups.
///
/// `host` is the accessible tab selected to run the naming call when the
/// implementation needs a page context; in-process implementations ignore
/// it.
#[async_trait]
pub trait GroupNamer: Send + Sync {
    async fn name_groups(
        &self,
        host: TabId,
        request: &NamingRequest,
    ) -> Result<NamingResponse, NamingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = NamingRequest::new(vec![DomainCount::new("github.com", 3)]).with_debug(true);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["domains"][0]["domain"], "github.com");
        assert_eq!(json["domains"][0]["tabCount"], 3);
        assert_eq!(json["debug"], true);
    }

    #[test]
    fn test_response_error_serializes_as_null() {
        let response = NamingResponse::default();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["error"].is_null());
        assert!(json.get("aiGenerated").is_none());
    }

    #[test]
    fn test_response_deserialize() {
        let json = r#"{
            "namedGroups": {"github.com": "GitHub"},
            "error": null,
            "usingFallback": true
        }"#;
        let response: NamingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.label("github.com"), Some("GitHub"));
        assert_eq!(response.using_fallback, Some(true));
        assert_eq!(response.ai_generated, None);
    }
}
