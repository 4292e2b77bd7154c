//! `group` and `preview` commands: replay a run over a tab snapshot.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::json;
use tracing::{info, warn};

use tabweaver_browser_memory::{
    MemoryBrowser, MemoryStore, PageHandler, PageScriptHost, ScriptedLanguageModel,
    load_snapshot,
};
use tabweaver_config::Config;
use tabweaver_core::naming::serve_naming_request;
use tabweaver_core::{
    DelegatingNamer, GroupingOrchestrator, NamingOptions, OracleNamer, OrchestratorOptions,
    StatusStore,
};

pub(crate) struct GroupArgs<'a> {
    pub snapshot: &'a Path,
    pub cancel: bool,
    pub model_response: Option<&'a Path>,
    pub model_unavailable: bool,
}

fn language_model(args: &GroupArgs<'_>) -> anyhow::Result<ScriptedLanguageModel> {
    if args.model_unavailable {
        return Ok(ScriptedLanguageModel::unavailable());
    }
    match args.model_response {
        Some(path) => Ok(ScriptedLanguageModel::replying(std::fs::read_to_string(path)?)),
        None => Ok(ScriptedLanguageModel::unavailable()),
    }
}

fn build(
    config: &Config,
    snapshot: &Path,
    model: ScriptedLanguageModel,
) -> anyhow::Result<(Arc<GroupingOrchestrator>, Arc<StatusStore>)> {
    let tabs = load_snapshot(snapshot)?;
    info!("Loaded {} tabs from {}", tabs.len(), snapshot.display());
    let browser = Arc::new(MemoryBrowser::with_tabs(tabs));

    let oracle = Arc::new(
        OracleNamer::new(Arc::new(model)).with_options(NamingOptions::from(&config.naming)),
    );
    let handler: PageHandler = Arc::new(move |_tab, payload| {
        let oracle = oracle.clone();
        async move { serve_naming_request(&oracle, payload).await }.boxed()
    });
    let host = Arc::new(PageScriptHost::spawn(handler).with_browser(browser.clone()));

    let status = Arc::new(
        StatusStore::new(Arc::new(MemoryStore::new()))
            .with_freshness(Duration::from_secs(config.status.freshness_secs)),
    );
    let orchestrator = Arc::new(GroupingOrchestrator::new(
        browser,
        Arc::new(DelegatingNamer::new(host)),
        status.clone(),
        OrchestratorOptions::from_config(config),
    ));
    Ok((orchestrator, status))
}

async fn print_status(status: &StatusStore) -> anyhow::Result<()> {
    let record = status.load().await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub(crate) async fn run_group(config: &Config, args: GroupArgs<'_>) -> anyhow::Result<()> {
    let model = language_model(&args)?;
    let (orchestrator, status) = build(config, args.snapshot, model)?;

    if let Err(e) = orchestrator.begin().await {
        print_status(&status).await?;
        return Err(e.into());
    }

    if args.cancel {
        orchestrator.cancel().await?;
        info!("Preview cancelled, no tabs were grouped");
        println!("{}", json!({ "status": "cancelled" }));
        return Ok(());
    }

    let result = orchestrator.confirm().await;
    print_status(&status).await?;
    match result {
        Ok(outcome) => {
            for failed in &outcome.failed {
                warn!("{} ({}): {}", failed.label, failed.domain, failed.reason);
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn run_preview(config: &Config, snapshot: &Path) -> anyhow::Result<()> {
    let (orchestrator, status) = build(config, snapshot, ScriptedLanguageModel::unavailable())?;
    if let Err(e) = orchestrator.begin().await {
        print_status(&status).await?;
        return Err(e.into());
    }
    let preview = status.load_preview().await?;
    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}
