use std::sync::Arc;

use tracing::debug;

use alloffers_types::dom::{self, NodeId, Selector, class};
use alloffers_types::patch::Patch;

use crate::config::Timings;
use crate::dom::Dom;

/// Alerts present now that are not marked permanent.
pub fn pending_alerts(dom: &dyn Dom) -> Vec<NodeId> {
    let permanent = dom.query_all(&dom::permanent_alerts());
    dom.query_all(&dom::alerts())
        .into_iter()
        .filter(|node| !permanent.contains(node))
        .collect()
}

/// Fade every transient alert after `flash_delay`, then remove it once
/// the fade has run.
pub async fn dismiss_flash_messages(dom: Arc<dyn Dom>, timings: Timings) {
    let alerts = pending_alerts(dom.as_ref());
    if alerts.is_empty() {
        return;
    }

    tokio::time::sleep(timings.flash_delay).await;
    for node in &alerts {
        dom.apply(Patch::add_class(Selector::Node(*node), class::FADE));
    }

    tokio::time::sleep(timings.flash_fade).await;
    for node in &alerts {
        dom.apply(Patch::Remove { target: Selector::Node(*node) });
    }
    debug!(count = alerts.len(), "Flash messages dismissed");
}
