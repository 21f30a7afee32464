use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use alloffers_types::dom::{NodeId, Selector};
use alloffers_types::patch::{Display, NoticeLevel, Patch, Widget};

use super::Dom;
use crate::markup;

/// One element of a [`MemoryDom`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: BTreeSet<String>,
    attrs: BTreeMap<String, String>,
    html: String,
    display: Option<Display>,
    widgets: Vec<Widget>,
    parent: Option<NodeId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_string(), ..Self::default() }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl ToString) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.html = markup::escape(text);
        self
    }

    pub fn with_display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn text(&self) -> String {
        markup::text_content(&self.html)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Inline `display`, if one was ever set.
    pub fn display(&self) -> Option<Display> {
        self.display
    }

    /// Hidden only when explicitly set to `display: none`.
    pub fn is_displayed(&self) -> bool {
        self.display != Some(Display::None)
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        match selector {
            Selector::Id(id) => self.id.as_deref() == Some(id.as_str()),
            Selector::Class(class) => self.classes.contains(class),
            Selector::Attr { name, value: None } => self.attrs.contains_key(name),
            Selector::Attr { name, value: Some(value) } => self.attrs.get(name) == Some(value),
            Selector::Node(target) => *target == node,
        }
    }
}

#[derive(Debug, Default)]
struct DomState {
    nodes: BTreeMap<NodeId, Element>,
    next_id: u64,
    notices: Vec<(NoticeLevel, String)>,
    location: Option<String>,
}

impl DomState {
    fn first_match(&self, selector: &Selector) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(node, el)| el.matches(**node, selector))
            .map(|(node, _)| *node)
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = vec![root];
        let mut i = 0;
        while i < out.len() {
            let parent = out[i];
            out.extend(
                self.nodes
                    .iter()
                    .filter(|(_, el)| el.parent == Some(parent))
                    .map(|(node, _)| *node),
            );
            i += 1;
        }
        out
    }
}

/// In-memory document. Nodes are kept in insertion order, which doubles as
/// document order; single-target patches hit the first match.
#[derive(Debug, Default)]
pub struct MemoryDom {
    state: Mutex<DomState>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skeleton of the dashboard layout every page extends: notification
    /// badge, search box, sidebar with its toggles, overlay and content.
    pub fn dashboard() -> Self {
        let dom = Self::new();
        let nav = dom.insert(Element::new("nav"));
        dom.insert_child(nav, Element::new("span").with_class("notification-badge"));
        let search = dom.insert_child(nav, Element::new("form"));
        dom.insert_child(search, Element::new("input").with_id("search-input"));
        dom.insert_child(search, Element::new("div").with_id("search-results").with_display(Display::None));
        dom.insert_child(nav, Element::new("button").with_class("mobile-menu-toggle"));

        let sidebar = dom.insert(Element::new("aside").with_class("sidebar"));
        dom.insert_child(sidebar, Element::new("button").with_class("sidebar-toggle"));
        dom.insert(Element::new("div").with_class("sidebar-overlay"));
        dom.insert(Element::new("main").with_class("dashboard-content"));
        dom
    }

    pub fn insert(&self, element: Element) -> NodeId {
        let mut state = self.lock();
        state.next_id += 1;
        let node = NodeId(state.next_id);
        state.nodes.insert(node, element);
        node
    }

    pub fn insert_child(&self, parent: NodeId, mut element: Element) -> NodeId {
        element.parent = Some(parent);
        self.insert(element)
    }

    /// First element matching `selector`.
    pub fn element(&self, selector: &Selector) -> Option<Element> {
        let state = self.lock();
        state.first_match(selector).and_then(|node| state.nodes.get(&node).cloned())
    }

    /// First node matching `selector`.
    pub fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.lock().first_match(selector)
    }

    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notices shown so far, oldest first.
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.lock().notices.clone()
    }

    /// Last navigation target, if the page was asked to leave.
    pub fn location(&self) -> Option<String> {
        self.lock().location.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DomState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Dom for MemoryDom {
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.lock()
            .nodes
            .iter()
            .filter(|(node, el)| el.matches(**node, selector))
            .map(|(node, _)| *node)
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.lock().nodes.get(&node)?.attrs.get(name).cloned()
    }

    fn contains(&self, container: &Selector, node: NodeId) -> bool {
        let state = self.lock();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            let Some(el) = state.nodes.get(&current) else {
                return false;
            };
            if el.matches(current, container) {
                return true;
            }
            cursor = el.parent;
        }
        false
    }

    fn apply(&self, patch: Patch) {
        let mut state = self.lock();
        let target = match patch.target() {
            Some(selector) => match state.first_match(selector) {
                Some(node) => Some(node),
                None => return,
            },
            None => None,
        };

        match (patch, target) {
            (Patch::Notify { level, message }, _) => state.notices.push((level, message)),
            (Patch::Navigate { url }, _) => state.location = Some(url),
            (Patch::Remove { .. }, Some(node)) => {
                for node in state.descendants(node) {
                    state.nodes.remove(&node);
                }
            }
            (patch, Some(node)) => {
                let Some(el) = state.nodes.get_mut(&node) else {
                    return;
                };
                match patch {
                    Patch::SetText { text, .. } => el.html = markup::escape(&text),
                    Patch::SetHtml { html, .. } => el.html = html,
                    Patch::SetClass { class, on: true, .. } => {
                        el.classes.insert(class.to_string());
                    }
                    Patch::SetClass { class, on: false, .. } => {
                        el.classes.remove(class);
                    }
                    Patch::SetDisplay { display, .. } => el.display = Some(display),
                    Patch::AttachWidget { widget, .. } => el.widgets.push(widget),
                    Patch::Remove { .. } | Patch::Notify { .. } | Patch::Navigate { .. } => {}
                }
            }
            (_, None) => {}
        }
    }
}
