use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use alloffers_types::dom::{self, NodeId};
use alloffers_ui::dom::{Element, MemoryDom};

/// One element of a page fixture, as written in the JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureElement {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<FixtureElement>,
}

impl FixtureElement {
    fn element(&self) -> Element {
        let mut element = Element::new(&self.tag);
        if let Some(id) = &self.id {
            element = element.with_id(id);
        }
        for class in &self.classes {
            element = element.with_class(class);
        }
        for (name, value) in &self.attrs {
            element = element.with_attr(name, value);
        }
        if let Some(text) = &self.text {
            element = element.with_text(text);
        }
        element
    }
}

pub fn parse(json: &str) -> anyhow::Result<Vec<FixtureElement>> {
    serde_json::from_str(json).context("invalid page fixture")
}

pub fn load(path: &Path) -> anyhow::Result<Vec<FixtureElement>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read page fixture {}", path.display()))?;
    parse(&json)
}

/// Append `elements` to the dashboard content area, or to the document root
/// when the page has none. Returns how many nodes were inserted.
pub fn mount(dom: &MemoryDom, elements: &[FixtureElement]) -> usize {
    let parent = dom.find(&dom::dashboard_content());
    elements.iter().map(|element| insert(dom, parent, element)).sum()
}

fn insert(dom: &MemoryDom, parent: Option<NodeId>, fixture: &FixtureElement) -> usize {
    let node = match parent {
        Some(parent) => dom.insert_child(parent, fixture.element()),
        None => dom.insert(fixture.element()),
    };
    1 + fixture.children.iter().map(|child| insert(dom, Some(node), child)).sum::<usize>()
}
