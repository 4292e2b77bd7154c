use std::sync::Arc;

use futures::FutureExt;
use serde_json::json;

use tabweaver_browser_memory::{PageHandler, PageScriptHost, ScriptedLanguageModel};
use tabweaver_protocols::{
    Availability, DomainCount, GroupNamer, ModelParams, NamingError, NamingRequest,
    NamingResponse, TabId,
};

use super::*;

fn request(domains: &[(&str, usize)]) -> NamingRequest {
    NamingRequest::new(
        domains
            .iter()
            .map(|(d, n)| DomainCount::new(*d, *n))
            .collect(),
    )
}

fn oracle(model: ScriptedLanguageModel) -> (Arc<ScriptedLanguageModel>, OracleNamer) {
    let model = Arc::new(model);
    let namer = OracleNamer::new(model.clone());
    (model, namer)
}

// ---- parser ----

#[test]
fn test_parse_labels_basic() {
    let parsed = parse_labels(
        "github.com|Coding & Dev\nyoutube.com|Video Content",
        ["github.com", "youtube.com"],
        MAX_LABEL_LEN,
    );
    assert_eq!(parsed.labels.len(), 2);
    assert_eq!(parsed.labels["github.com"], "Coding & Dev");
    assert_eq!(parsed.labels["youtube.com"], "Video Content");
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_parse_labels_tolerates_noise() {
    let response = "Sure! Here are the names:\n\n  GitHub.com | Code!!  \nnews.com|Daily: News\nother.org|Misc\n";
    let parsed = parse_labels(response, ["github.com", "news.com"], MAX_LABEL_LEN);

    assert_eq!(parsed.labels["github.com"], "Code");
    assert_eq!(parsed.labels["news.com"], "Daily News");
    assert_eq!(parsed.diagnostics.len(), 2);
    assert_eq!(parsed.diagnostics[0].line_no, 1);
    assert_eq!(parsed.diagnostics[0].reason, LineRejection::MissingSeparator);
    assert_eq!(
        parsed.diagnostics[1].reason,
        LineRejection::UnknownDomain("other.org".to_string())
    );
}

#[test]
fn test_parse_labels_label_keeps_later_separators() {
    let parsed = parse_labels("a.com|Read|Later", ["a.com"], MAX_LABEL_LEN);
    assert_eq!(parsed.labels["a.com"], "ReadLater");
}

#[test]
fn test_parse_labels_first_valid_line_wins() {
    let parsed = parse_labels(
        "a.com|!\na.com|First\na.com|Second",
        ["a.com"],
        MAX_LABEL_LEN,
    );
    assert_eq!(parsed.labels["a.com"], "First");
    assert!(matches!(
        parsed.diagnostics[0].reason,
        LineRejection::LabelTooShort(_)
    ));
    assert_eq!(
        parsed.diagnostics[1].reason,
        LineRejection::DuplicateDomain("a.com".to_string())
    );
}

#[test]
fn test_parse_labels_empty_domain() {
    let parsed = parse_labels("|Label", ["a.com"], MAX_LABEL_LEN);
    assert!(parsed.is_empty());
    assert_eq!(parsed.diagnostics[0].reason, LineRejection::EmptyDomain);
}

#[test]
fn test_sanitize_label() {
    assert_eq!(sanitize_label("  News & Media!  ", 50).as_deref(), Some("News & Media"));
    assert_eq!(sanitize_label("C++ Docs", 50).as_deref(), Some("C Docs"));
    assert_eq!(sanitize_label("Émoji 🚀 Zone", 50).as_deref(), Some("moji  Zone"));
    assert_eq!(sanitize_label("!", 50), None);
    assert_eq!(sanitize_label("a", 50), None);
    assert_eq!(sanitize_label("", 50), None);
}

#[test]
fn test_sanitize_label_truncates_and_retrims() {
    let long = format!("{} tail", "x".repeat(49));
    let label = sanitize_label(&long, 50).unwrap();
    assert_eq!(label.len(), 49);
    assert!(is_valid_label(&label));

    assert_eq!(sanitize_label("Hello World", 6).as_deref(), Some("Hello"));
    // Never longer than the hard maximum.
    assert_eq!(sanitize_label(&"y".repeat(80), 200).unwrap().len(), MAX_LABEL_LEN);
}

#[test]
fn test_is_valid_label() {
    assert!(is_valid_label("Coding & Dev"));
    assert!(is_valid_label("AB"));
    assert!(!is_valid_label("A"));
    assert!(!is_valid_label("News!"));
    assert!(!is_valid_label(&"z".repeat(51)));
}

// ---- fallback ----

#[test]
fn test_fallback_label_special_names() {
    assert_eq!(fallback_label("github.com"), "GitHub");
    assert_eq!(fallback_label("www.youtube.com"), "YouTube");
    assert_eq!(fallback_label("stackoverflow.com"), "Stack Overflow");
}

#[test]
fn test_fallback_label_capitalizes_first_label() {
    assert_eq!(fallback_label("docs.rs"), "Docs");
    assert_eq!(fallback_label("www.example.org"), "Example");
    assert_eq!(fallback_label("my-site.dev"), "My-site");
}

#[test]
fn test_fallback_label_always_valid() {
    for domain in ["a.com", "", "_.io", "1.2.3.4", "localhost", "xn--bcher-kva.example"] {
        let label = fallback_label(domain);
        assert!(is_valid_label(&label), "{domain:?} -> {label:?}");
    }
    assert_eq!(fallback_label("a.com"), "A Tabs");
    assert_eq!(fallback_label(""), "Tabs");
}

#[test]
fn test_fallback_label_deterministic() {
    assert_eq!(fallback_label("github.com"), fallback_label("github.com"));
    assert_eq!(fallback_label("GitHub.com"), "GitHub");
}

// ---- prompt ----

#[test]
fn test_build_prompt_lists_domains() {
    let prompt = build_prompt(&[DomainCount::new("a.com", 1), DomainCount::new("b.com", 3)]);
    assert!(prompt.contains("a.com (1 tab)"));
    assert!(prompt.contains("b.com (3 tabs)"));
    assert!(prompt.contains("DOMAIN|GROUP_NAME"));
}

// ---- reconcile ----

#[test]
fn test_reconcile_completes_and_cleans() {
    let req = request(&[("a.com", 2), ("b.com", 2), ("c.com", 2)]);
    let mut response = NamingResponse::default();
    response.named_groups.insert("a.com".into(), "Alpha!!".into());
    response.named_groups.insert("b.com".into(), "?".into());
    response.named_groups.insert("zzz.com".into(), "Stray".into());

    let out = reconcile(&req, response, MAX_LABEL_LEN);
    let keys: Vec<_> = out.named_groups.keys().cloned().collect();
    assert_eq!(keys, vec!["a.com", "b.com", "c.com"]);
    assert_eq!(out.named_groups["a.com"], "Alpha");
    assert_eq!(out.named_groups["b.com"], "B Tabs");
    assert_eq!(out.named_groups["c.com"], "C Tabs");
    assert_eq!(out.ai_generated, Some(true));
    assert_eq!(out.using_fallback, Some(true));
}

#[test]
fn test_fallback_response() {
    let req = request(&[("github.com", 2), ("news.com", 3)]);
    let out = fallback_response(&req, "tab closed");
    assert_eq!(out.named_groups["github.com"], "GitHub");
    assert_eq!(out.named_groups["news.com"], "News");
    assert_eq!(out.error.as_deref(), Some("tab closed"));
    assert_eq!(out.ai_generated, Some(false));
    assert_eq!(out.using_fallback, Some(true));
}

// ---- oracle ----

#[tokio::test]
async fn test_oracle_uses_model_labels() {
    let (model, namer) = oracle(ScriptedLanguageModel::replying(
        "github.com|Coding & Dev\nnews.com|Daily News",
    ));
    let out = namer.name(&request(&[("github.com", 3), ("news.com", 2)])).await;

    assert_eq!(out.named_groups["github.com"], "Coding & Dev");
    assert_eq!(out.named_groups["news.com"], "Daily News");
    assert_eq!(out.error, None);
    assert_eq!(out.ai_generated, Some(true));
    assert_eq!(out.using_fallback, Some(false));
    assert_eq!(model.sessions_created(), 1);
    assert_eq!(model.sessions_destroyed(), 1);
    assert_eq!(model.prompts().len(), 1);
}

#[tokio::test]
async fn test_oracle_fills_missing_domains() {
    let (_, namer) = oracle(ScriptedLanguageModel::replying("github.com|Code"));
    let out = namer.name(&request(&[("github.com", 3), ("news.com", 2)])).await;
    assert_eq!(out.named_groups["github.com"], "Code");
    assert_eq!(out.named_groups["news.com"], "News");
    assert_eq!(out.ai_generated, Some(true));
    assert_eq!(out.using_fallback, Some(true));
}

#[tokio::test]
async fn test_oracle_unavailable_skips_session() {
    let (model, namer) = oracle(ScriptedLanguageModel::unavailable());
    let out = namer.name(&request(&[("github.com", 2)])).await;

    assert_eq!(out.named_groups["github.com"], "GitHub");
    assert_eq!(out.error.as_deref(), Some("AI model not available on this system."));
    assert_eq!(out.ai_generated, Some(false));
    assert_eq!(out.using_fallback, Some(true));
    assert_eq!(model.sessions_created(), 0);
}

#[tokio::test]
async fn test_oracle_destroys_session_on_prompt_failure() {
    let (model, namer) = oracle(ScriptedLanguageModel::failing_prompt("quota"));
    let out = namer.name(&request(&[("news.com", 2)])).await;
    assert_eq!(out.named_groups["news.com"], "News");
    assert!(out.error.is_some());
    assert_eq!(model.sessions_created(), 1);
    assert_eq!(model.sessions_destroyed(), 1);
}

#[tokio::test]
async fn test_oracle_session_failure_falls_back() {
    let (_, namer) = oracle(ScriptedLanguageModel::failing_session("busy"));
    let out = namer.name(&request(&[("news.com", 2)])).await;
    assert_eq!(out.named_groups["news.com"], "News");
    assert_eq!(out.using_fallback, Some(true));
}

#[tokio::test]
async fn test_oracle_garbage_output_falls_back() {
    let (_, namer) = oracle(ScriptedLanguageModel::replying("I cannot help with that."));
    let out = namer.name(&request(&[("news.com", 2)])).await;
    assert_eq!(out.named_groups["news.com"], "News");
    assert_eq!(out.ai_generated, Some(false));
    assert!(out.error.is_some());
}

#[tokio::test]
async fn test_oracle_caps_sampling_params() {
    let (model, namer) = oracle(
        ScriptedLanguageModel::replying("a.com|Alpha").with_params(ModelParams {
            default_temperature: 1.0,
            max_temperature: 0.2,
            default_top_k: 3,
            max_top_k: 100,
        }),
    );
    namer.name(&request(&[("a.com", 2)])).await;

    let options = model.last_options().unwrap();
    assert_eq!(options.temperature, 0.2);
    assert_eq!(options.top_k, 30);
}

#[tokio::test]
async fn test_oracle_downloadable_model_is_used() {
    let (model, namer) = oracle(
        ScriptedLanguageModel::replying("a.com|Alpha").with_availability(Availability::Downloadable),
    );
    let out = namer.name(&request(&[("a.com", 2)])).await;
    assert_eq!(out.named_groups["a.com"], "Alpha");
    assert_eq!(model.sessions_created(), 1);
}

#[tokio::test]
async fn test_oracle_empty_request() {
    let (model, namer) = oracle(ScriptedLanguageModel::replying("a.com|Alpha"));
    let out = namer.name(&NamingRequest::new(Vec::new())).await;
    assert!(out.named_groups.is_empty());
    assert_eq!(model.sessions_created(), 0);
}

// ---- delegation ----

fn page_host(model: Arc<ScriptedLanguageModel>) -> PageScriptHost {
    let oracle = Arc::new(OracleNamer::new(model));
    let handler: PageHandler = Arc::new(move |_tab, payload| {
        let oracle = oracle.clone();
        async move { serve_naming_request(&oracle, payload).await }.boxed()
    });
    PageScriptHost::spawn(handler)
}

#[tokio::test]
async fn test_delegating_namer_round_trip() {
    let model = Arc::new(ScriptedLanguageModel::replying("github.com|Coding"));
    let host = Arc::new(page_host(model.clone()));
    let namer = DelegatingNamer::new(host.clone());

    let out = namer
        .name_groups(TabId(1), &request(&[("github.com", 2), ("news.com", 2)]))
        .await
        .unwrap();
    assert_eq!(out.named_groups["github.com"], "Coding");
    assert_eq!(out.named_groups["news.com"], "News");
    assert_eq!(host.calls(), 1);
    assert_eq!(model.sessions_destroyed(), 1);
}

#[tokio::test]
async fn test_serve_naming_request_rejects_bad_envelopes() {
    let (_, namer) = oracle(ScriptedLanguageModel::replying(""));
    assert!(serve_naming_request(&namer, json!({"nope": true})).await.is_err());

    let envelope = json!({ "action": "other", "request": { "domains": [] } });
    let err = serve_naming_request(&namer, envelope).await.unwrap_err();
    assert!(err.contains("other"));
}

#[tokio::test]
async fn test_delegating_namer_surfaces_page_errors() {
    let handler: PageHandler = Arc::new(|_, _| async { Err("navigated away".to_string()) }.boxed());
    let namer = DelegatingNamer::new(Arc::new(PageScriptHost::spawn(handler)));
    let err = namer
        .name_groups(TabId(4), &request(&[("a.com", 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, NamingError::Delegate(_)));
}

#[tokio::test]
async fn test_delegating_namer_malformed_reply() {
    let handler: PageHandler = Arc::new(|_, _| async { Ok(json!("not a response")) }.boxed());
    let namer = DelegatingNamer::new(Arc::new(PageScriptHost::spawn(handler)));
    let err = namer
        .name_groups(TabId(4), &request(&[("a.com", 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, NamingError::Malformed(_)));
}

#[tokio::test]
async fn test_static_and_failing_namers() {
    let namer = StaticNamer::new().with_label("a.com", "Alpha");
    let out = namer
        .name_groups(TabId(1), &request(&[("a.com", 2), ("b.com", 2)]))
        .await
        .unwrap();
    assert_eq!(out.named_groups.len(), 1);
    assert_eq!(namer.calls(), 1);

    assert!(FailingNamer.name_groups(TabId(1), &request(&[("a.com", 2)])).await.is_err());
}
