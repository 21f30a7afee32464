//! Load-time cosmetics: bootstrap widget activation and scroll reveal.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use alloffers_types::dom::{self, NodeId, Selector, class};
use alloffers_types::patch::{Patch, Widget};

use crate::dom::Dom;

/// Attach tooltips and popovers to every trigger present right now.
/// Elements added later are not picked up.
pub fn init_widgets(dom: &dyn Dom) -> usize {
    let mut attached = 0;
    for (selector, widget) in [(dom::tooltip_triggers(), Widget::Tooltip), (dom::popover_triggers(), Widget::Popover)] {
        for node in dom.query_all(&selector) {
            dom.apply(Patch::AttachWidget { target: Selector::Node(node), widget });
            attached += 1;
        }
    }
    debug!(attached, "Widgets attached");
    attached
}

/// Observer configuration for the reveal animation.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    /// Minimum visible ratio that counts as intersecting.
    pub threshold: f64,
    pub root_margin: &'static str,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self { threshold: 0.1, root_margin: "0px 0px -50px 0px" }
    }
}

/// One visibility report from the host's observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub ratio: f64,
}

/// Adds `fade-in-up` to each observed card the first time it scrolls into
/// view, then stops watching it.
pub struct RevealWatcher {
    dom: Arc<dyn Dom>,
    options: RevealOptions,
    observed: Mutex<BTreeSet<NodeId>>,
}

impl RevealWatcher {
    pub fn new(dom: Arc<dyn Dom>, options: RevealOptions) -> Self {
        Self { dom, options, observed: Mutex::new(BTreeSet::new()) }
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Start observing every reveal target on the page.
    pub fn observe_all(&self) -> usize {
        let mut observed = self.observed.lock().unwrap_or_else(|e| e.into_inner());
        for selector in dom::reveal_targets() {
            observed.extend(self.dom.query_all(&selector));
        }
        observed.len()
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observed.lock().unwrap_or_else(|e| e.into_inner()).contains(&node)
    }

    /// Feed a batch of reports. Returns the nodes revealed by this batch.
    pub fn on_intersections(&self, entries: &[Intersection]) -> Vec<NodeId> {
        let mut observed = self.observed.lock().unwrap_or_else(|e| e.into_inner());
        let mut revealed = Vec::new();
        for entry in entries {
            if entry.ratio < self.options.threshold || !observed.remove(&entry.node) {
                continue;
            }
            self.dom.apply(Patch::add_class(Selector::Node(entry.node), class::FADE_IN_UP));
            revealed.push(entry.node);
        }
        revealed
    }
}
