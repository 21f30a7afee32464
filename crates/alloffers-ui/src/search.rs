use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use alloffers_types::dom::{self, NodeId};
use alloffers_types::patch::{Display, Patch};

use crate::backend::SearchBackend;
use crate::config::{MIN_QUERY_LEN, PageConfig};
use crate::dom::Dom;
use crate::fence::SequenceFence;
use crate::markup;

/// Debounced live search dropdown.
///
/// The instance owns its pending debounce timer; new input aborts it.
/// Requests already sent are left to finish and are fenced instead, so only
/// the most recently issued query can render.
pub struct LiveSearch<B> {
    backend: Arc<B>,
    dom: Arc<dyn Dom>,
    fence: Arc<SequenceFence>,
    pending: Option<JoinHandle<()>>,
    config: PageConfig,
}

impl<B: SearchBackend> LiveSearch<B> {
    pub fn new(backend: Arc<B>, dom: Arc<dyn Dom>, config: PageConfig) -> Self {
        Self {
            backend,
            dom,
            fence: Arc::new(SequenceFence::new()),
            pending: None,
            config,
        }
    }

    /// Handle one input event with the field's current value.
    pub fn on_input(&mut self, raw: &str) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }

        let query = raw.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            self.fence.invalidate();
            self.hide();
            return;
        }

        let query = query.to_string();
        let backend = self.backend.clone();
        let dom = self.dom.clone();
        let fence = self.fence.clone();
        let delay = self.config.timings.debounce;
        let locale = self.config.locale;
        let login_url = self.config.login_url();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let seq = fence.issue();
            debug!(seq, query = %query, "Search issued");
            // Detached so the next keystroke only cancels the timer, never
            // a request already on the wire.
            tokio::spawn(async move {
                match backend.search(&query).await {
                    Ok(results) => {
                        let html = if results.is_empty() {
                            markup::no_results(locale)
                        } else {
                            markup::search_results(&results)
                        };
                        let shown = fence.run_if_current(seq, || {
                            dom.apply(Patch::html(dom::search_results(), html));
                            dom.apply(Patch::display(dom::search_results(), Display::Block));
                        });
                        if shown.is_none() {
                            debug!(seq, query = %query, "Stale search response dropped");
                        }
                    }
                    Err(e) if e.is_unauthorized() => {
                        warn!(seq, query = %query, "Search rejected, session expired");
                        dom.apply(Patch::navigate(login_url));
                    }
                    Err(e) => warn!(seq, query = %query, error = %e, "Search failed"),
                }
            });
        }));
    }

    /// Global click listener: clicks outside the input and the panel close it.
    pub fn on_click(&self, target: NodeId) {
        let inside = self.dom.contains(&dom::search_input(), target)
            || self.dom.contains(&dom::search_results(), target);
        if !inside {
            self.dom.apply(Patch::display(dom::search_results(), Display::None));
        }
    }

    fn hide(&self) {
        self.dom.apply(Patch::html(dom::search_results(), ""));
        self.dom.apply(Patch::display(dom::search_results(), Display::None));
    }
}

impl<B> Drop for LiveSearch<B> {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}
