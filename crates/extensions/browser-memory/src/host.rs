//! Page-context script host.
//!
//! Requests cross to a page task as serialized text and replies come back
//! the same way, matched to their caller by request id.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use tabweaver_protocols::{BrowserError, ScriptHost, TabId, TabsApi};

use crate::browser::MemoryBrowser;

/// Page-side handler: receives the deserialized payload for a tab.
pub type PageHandler =
    Arc<dyn Fn(TabId, Value) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

#[derive(Serialize, Deserialize)]
struct PageRequest {
    id: u64,
    tab: TabId,
    payload: Value,
}

#[derive(Serialize, Deserialize)]
struct PageReply {
    id: u64,
    result: Result<Value, String>,
}

struct PendingRequest {
    tab: TabId,
    tx: oneshot::Sender<Result<Value, BrowserError>>,
}

type Pending = Arc<Mutex<HashMap<u64, PendingRequest>>>;

/// [`ScriptHost`] whose page contexts run on a background task.
pub struct PageScriptHost {
    outbound: mpsc::UnboundedSender<String>,
    request_id: AtomicU64,
    pending: Pending,
    browser: Option<Arc<MemoryBrowser>>,
    calls: AtomicUsize,
    _page_task: tokio::task::JoinHandle<()>,
    _reply_task: tokio::task::JoinHandle<()>,
}

impl PageScriptHost {
    /// Start the page task. Must be called inside a tokio runtime.
    pub fn spawn(handler: PageHandler) -> Self {
        let (outbound, requests) = mpsc::unbounded_channel::<String>();
        let (reply_tx, replies) = mpsc::unbounded_channel::<String>();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

        let page_task = tokio::spawn(Self::page_loop(requests, reply_tx, handler));
        let reply_task = tokio::spawn(Self::reply_loop(replies, pending.clone()));

        Self {
            outbound,
            request_id: AtomicU64::new(1),
            pending,
            browser: None,
            calls: AtomicUsize::new(0),
            _page_task: page_task,
            _reply_task: reply_task,
        }
    }

    /// Reject requests for tabs that are missing or cannot run scripts.
    pub fn with_browser(mut self, browser: Arc<MemoryBrowser>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Number of `execute` calls that reached a page.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn page_loop(
        mut requests: mpsc::UnboundedReceiver<String>,
        replies: mpsc::UnboundedSender<String>,
        handler: PageHandler,
    ) {
        while let Some(text) = requests.recv().await {
            trace!("page recv: {}", text);
            let request: PageRequest = match serde_json::from_str(&text) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Dropping malformed page request: {}", e);
                    continue;
                }
            };
            let handler = handler.clone();
            let replies = replies.clone();
            tokio::spawn(async move {
                let result = handler(request.tab, request.payload).await;
                let reply = PageReply {
                    id: request.id,
                    result,
                };
                match serde_json::to_string(&reply) {
                    Ok(text) => {
                        let _ = replies.send(text);
                    }
                    Err(e) => warn!("Failed to serialize page reply: {}", e),
                }
            });
        }
    }

    async fn reply_loop(mut replies: mpsc::UnboundedReceiver<String>, pending: Pending) {
        while let Some(text) = replies.recv().await {
            trace!("page reply: {}", text);
            let reply: PageReply = match serde_json::from_str(&text) {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Dropping malformed page reply: {}", e);
                    continue;
                }
            };
            let waiting = pending.lock().remove(&reply.id);
            if let Some(req) = waiting {
                let result = reply.result.map_err(|message| BrowserError::ScriptFailed {
                    tab: req.tab,
                    message,
                });
                let _ = req.tx.send(result);
            }
        }
    }

    async fn check_tab(&self, tab: TabId) -> Result<(), BrowserError> {
        let Some(browser) = &self.browser else {
            return Ok(());
        };
        let live = browser.get_tab(tab).await?;
        let scriptable = live
            .url
            .as_deref()
            .is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"));
        if !scriptable {
            return Err(BrowserError::ScriptFailed {
                tab,
                message: "cannot access contents of this page".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ScriptHost for PageScriptHost {
    async fn execute(&self, tab: TabId, payload: Value) -> Result<Value, BrowserError> {
        self.check_tab(tab).await?;

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let text = serde_json::to_string(&PageRequest { id, tab, payload }).map_err(|e| {
            BrowserError::ScriptFailed {
                tab,
                message: e.to_string(),
            }
        })?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tab, tx });

        if self.outbound.send(text).is_err() {
            self.pending.lock().remove(&id);
            return Err(BrowserError::Disconnected);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("Sent page request {} to tab {}", id, tab);

        rx.await.map_err(|_| BrowserError::Disconnected)?
    }
}
