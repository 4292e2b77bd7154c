//! Group naming.
//!
//! The naming oracle turns a domain summary into human-readable labels.
//! Whatever the oracle does, every requested domain leaves this module with
//! exactly one valid label: oracle output is parsed strictly, and any
//! domain it fails to name gets a deterministic fallback.

mod delegate;
mod fallback;
mod oracle;
mod parser;
mod prompt;
mod stub;

pub use delegate::{DelegatingNamer, NAMING_ACTION, NamingEnvelope, serve_naming_request};
pub use fallback::fallback_label;
pub use oracle::{NamingOptions, OracleNamer};
pub use parser::{
    LABEL_SEPARATOR, LineDiagnostic, LineRejection, MAX_LABEL_LEN, MIN_LABEL_LEN, ParsedLabels,
    is_valid_label, parse_labels, sanitize_label,
};
pub use prompt::build_prompt;
pub use stub::{FailingNamer, StaticNamer};

use tabweaver_protocols::{NamingRequest, NamingResponse};

/// Response naming every requested domain with its fallback label.
pub fn fallback_response(request: &NamingRequest, notice: impl Into<String>) -> NamingResponse {
    let named_groups = request
        .domain_names()
        .map(|domain| (domain.to_string(), fallback_label(domain)))
        .collect();
    NamingResponse {
        named_groups,
        error: Some(notice.into()),
        ai_generated: Some(false),
        using_fallback: Some(true),
    }
}

/// Reconcile an untrusted response against the request.
///
/// Labels are re-sanitized, keys for unrequested domains are dropped and
/// missing domains receive fallback labels. The result's key set equals the
/// requested domain set.
pub fn reconcile(
    request: &NamingRequest,
    response: NamingResponse,
    max_label_len: usize,
) -> NamingResponse {
    let mut accepted = 0usize;
    let mut fallbacks = 0usize;

    let named_groups = request
        .domain_names()
        .map(|domain| {
            let label = response
                .label(domain)
                .and_then(|raw| sanitize_label(raw, max_label_len));
            let label = match label {
                Some(label) => {
                    accepted += 1;
                    label
                }
                None => {
                    fallbacks += 1;
                    fallback_label(domain)
                }
            };
            (domain.to_string(), label)
        })
        .collect();

    let remote_fallback = response.using_fallback.unwrap_or(false);
    let remote_ai = response.ai_generated.unwrap_or(accepted > 0);

    NamingResponse {
        named_groups,
        error: response.error,
        ai_generated: Some(remote_ai && accepted > 0),
        using_fallback: Some(remote_fallback || fallbacks > 0),
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
