//! Rendering adapters.
//!
//! Components never touch a document directly: they scan it through
//! [`Dom::query_all`] / [`Dom::attribute`] and describe changes as
//! [`Patch`] values. Adapters decide how a patch materializes.

mod logged;
mod memory;

pub use logged::LoggedDom;
pub use memory::{Element, MemoryDom};

use alloffers_types::dom::{NodeId, Selector};
use alloffers_types::patch::Patch;

pub trait Dom: Send + Sync {
    /// All nodes matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// Attribute value of a scanned node.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Whether `node` is, or descends from, an element matching `container`.
    fn contains(&self, container: &Selector, node: NodeId) -> bool;

    /// Apply one patch. Patches addressing nothing are ignored.
    fn apply(&self, patch: Patch);

    fn exists(&self, selector: &Selector) -> bool {
        !self.query_all(selector).is_empty()
    }

    fn apply_all(&self, patches: Vec<Patch>) {
        for patch in patches {
            self.apply(patch);
        }
    }
}

impl<D: Dom + ?Sized> Dom for std::sync::Arc<D> {
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        (**self).query_all(selector)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        (**self).attribute(node, name)
    }

    fn contains(&self, container: &Selector, node: NodeId) -> bool {
        (**self).contains(container, node)
    }

    fn apply(&self, patch: Patch) {
        (**self).apply(patch)
    }
}
