use std::sync::Arc;

use tracing::debug;

use alloffers_types::dom::{self, NodeId, SIDEBAR_COLLAPSED_KEY, class};
use alloffers_types::patch::Patch;

use crate::dom::Dom;
use crate::prefs::PreferenceStore;

/// Desktop collapse and mobile drawer state of the dashboard sidebar.
pub struct Sidebar {
    dom: Arc<dyn Dom>,
    store: Arc<dyn PreferenceStore>,
    collapsed: bool,
    mobile_open: bool,
}

impl Sidebar {
    /// Restore the collapsed flag, which only a stored `"true"` sets.
    /// The mobile drawer always starts closed.
    pub fn init(dom: Arc<dyn Dom>, store: Arc<dyn PreferenceStore>) -> Self {
        let collapsed = store.get(SIDEBAR_COLLAPSED_KEY).as_deref() == Some("true");
        let sidebar = Self { dom, store, collapsed, mobile_open: false };
        if collapsed {
            sidebar.render_collapsed();
        }
        debug!(collapsed, "Sidebar initialized");
        sidebar
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_mobile_open(&self) -> bool {
        self.mobile_open
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
        self.render_collapsed();
        self.store
            .set(SIDEBAR_COLLAPSED_KEY, if self.collapsed { "true" } else { "false" });
    }

    pub fn toggle_mobile(&mut self) {
        self.mobile_open = !self.mobile_open;
        self.render_mobile();
    }

    /// Overlay click. Leaves the desktop state alone.
    pub fn close_mobile(&mut self) {
        self.mobile_open = false;
        self.render_mobile();
    }

    /// Route a click to the matching control. Returns whether it was one.
    pub fn handle_click(&mut self, target: NodeId) -> bool {
        if self.dom.contains(&dom::sidebar_toggle(), target) {
            self.toggle_collapsed();
        } else if self.dom.contains(&dom::mobile_menu_toggle(), target) {
            self.toggle_mobile();
        } else if self.dom.contains(&dom::sidebar_overlay(), target) {
            self.close_mobile();
        } else {
            return false;
        }
        true
    }

    fn render_collapsed(&self) {
        self.dom.apply_all(vec![
            Patch::class(dom::sidebar(), class::COLLAPSED, self.collapsed),
            Patch::class(dom::dashboard_content(), class::SIDEBAR_COLLAPSED, self.collapsed),
        ]);
    }

    fn render_mobile(&self) {
        self.dom.apply_all(vec![
            Patch::class(dom::sidebar(), class::MOBILE_OPEN, self.mobile_open),
            Patch::class(dom::sidebar_overlay(), class::ACTIVE, self.mobile_open),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::prefs::MemoryStore;

    fn has(dom: &MemoryDom, selector: alloffers_types::dom::Selector, class: &str) -> bool {
        dom.element(&selector).unwrap().has_class(class)
    }

    #[test]
    fn only_literal_true_restores_collapsed() {
        for (stored, expected) in [(Some("true"), true), (Some("false"), false), (Some("TRUE"), false), (Some("1"), false), (None, false)] {
            let dom = Arc::new(MemoryDom::dashboard());
            let store = Arc::new(MemoryStore::new());
            if let Some(value) = stored {
                store.set(SIDEBAR_COLLAPSED_KEY, value);
            }
            let sidebar = Sidebar::init(dom.clone(), store);
            assert_eq!(sidebar.is_collapsed(), expected, "stored {:?}", stored);
            assert_eq!(has(&dom, dom::sidebar(), class::COLLAPSED), expected);
            assert_eq!(has(&dom, dom::dashboard_content(), class::SIDEBAR_COLLAPSED), expected);
            assert!(!sidebar.is_mobile_open());
        }
    }

    #[test]
    fn collapse_round_trips_through_store() {
        let store = Arc::new(MemoryStore::new());
        let mut sidebar = Sidebar::init(Arc::new(MemoryDom::dashboard()), store.clone());

        sidebar.toggle_collapsed();
        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("true"));
        assert!(Sidebar::init(Arc::new(MemoryDom::dashboard()), store.clone()).is_collapsed());

        sidebar.toggle_collapsed();
        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("false"));
        assert!(!Sidebar::init(Arc::new(MemoryDom::dashboard()), store).is_collapsed());
    }

    #[test]
    fn overlay_closes_mobile_without_touching_collapse() {
        let dom = Arc::new(MemoryDom::dashboard());
        let store = Arc::new(MemoryStore::new());
        store.set(SIDEBAR_COLLAPSED_KEY, "true");
        let mut sidebar = Sidebar::init(dom.clone(), store);

        let menu = dom.find(&dom::mobile_menu_toggle()).unwrap();
        assert!(sidebar.handle_click(menu));
        assert!(has(&dom, dom::sidebar(), class::MOBILE_OPEN));
        assert!(has(&dom, dom::sidebar_overlay(), class::ACTIVE));

        let overlay = dom.find(&dom::sidebar_overlay()).unwrap();
        assert!(sidebar.handle_click(overlay));
        assert!(!has(&dom, dom::sidebar(), class::MOBILE_OPEN));
        assert!(!has(&dom, dom::sidebar_overlay(), class::ACTIVE));
        assert!(sidebar.is_collapsed());
        assert!(has(&dom, dom::sidebar(), class::COLLAPSED));

        let content = dom.find(&dom::dashboard_content()).unwrap();
        assert!(!sidebar.handle_click(content));
    }
}
