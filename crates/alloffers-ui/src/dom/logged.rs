use alloffers_types::dom::{NodeId, Selector};
use alloffers_types::patch::Patch;

use super::Dom;

/// Adapter that records every patch through `tracing` before forwarding it.
pub struct LoggedDom<D> {
    inner: D,
}

impl<D: Dom> LoggedDom<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Dom> Dom for LoggedDom<D> {
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.inner.query_all(selector)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.attribute(node, name)
    }

    fn contains(&self, container: &Selector, node: NodeId) -> bool {
        self.inner.contains(container, node)
    }

    fn apply(&self, patch: Patch) {
        // Page-level patches are what the user actually notices; per-element
        // updates are debug noise.
        match &patch {
            Patch::Notify { .. } | Patch::Navigate { .. } => tracing::info!("{}", patch),
            _ => tracing::debug!("{}", patch),
        }
        self.inner.apply(patch);
    }
}
