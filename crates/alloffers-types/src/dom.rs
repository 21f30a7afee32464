use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Handle of a concrete element found by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// The subset of CSS selectors the pages' contract relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[name]` or `[name="value"]`
    Attr { name: String, value: Option<String> },
    /// A node returned by an earlier scan.
    Node(NodeId),
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Self::Class(class.into())
    }

    pub fn has_attr(name: impl Into<String>) -> Self {
        Self::Attr { name: name.into(), value: None }
    }

    pub fn attr_eq(name: impl Into<String>, value: impl ToString) -> Self {
        Self::Attr { name: name.into(), value: Some(value.to_string()) }
    }
}

impl From<NodeId> for Selector {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{}", id),
            Self::Class(class) => write!(f, ".{}", class),
            Self::Attr { name, value: None } => write!(f, "[{}]", name),
            Self::Attr { name, value: Some(value) } => write!(f, "[{}=\"{}\"]", name, value),
            Self::Node(node) => write!(f, "{}", node),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported selector '{0}'")]
pub struct SelectorParseError(pub String);

impl FromStr for Selector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || SelectorParseError(s.to_string());
        let valid_ident = |v: &str| !v.is_empty() && !v.contains(|c: char| c.is_whitespace());

        if let Some(id) = s.strip_prefix('#') {
            return valid_ident(id).then(|| Self::id(id)).ok_or_else(bad);
        }
        if let Some(class) = s.strip_prefix('.') {
            return valid_ident(class).then(|| Self::class(class)).ok_or_else(bad);
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            return match inner.split_once('=') {
                None if valid_ident(inner) => Ok(Self::has_attr(inner)),
                None => Err(bad()),
                Some((name, value)) => {
                    let value = value.trim_matches(|c| c == '"' || c == '\'');
                    if valid_ident(name) {
                        Ok(Self::attr_eq(name, value))
                    } else {
                        Err(bad())
                    }
                }
            };
        }
        if let Some(n) = s.strip_prefix("node:") {
            return n.parse().map(|n| Self::Node(NodeId(n))).map_err(|_| bad());
        }
        Err(bad())
    }
}

/// Storage key of the persisted sidebar flag.
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";

/// Attribute carrying an offer's expiry timestamp.
pub const EXPIRES_AT_ATTR: &str = "data-expires-at";

/// Attribute selecting the bootstrap widget kind.
pub const WIDGET_TOGGLE_ATTR: &str = "data-bs-toggle";

/// CSS classes toggled by components.
pub mod class {
    pub const LIKED: &str = "liked";
    pub const ACTIVE: &str = "active";
    pub const BTN_PRIMARY: &str = "btn-primary";
    pub const BTN_SECONDARY: &str = "btn-secondary";
    pub const BTN_OUTLINE_PRIMARY: &str = "btn-outline-primary";
    pub const COLLAPSED: &str = "collapsed";
    pub const SIDEBAR_COLLAPSED: &str = "sidebar-collapsed";
    pub const MOBILE_OPEN: &str = "mobile-open";
    pub const TEXT_DANGER: &str = "text-danger";
    pub const TEXT_WARNING: &str = "text-warning";
    pub const FADE: &str = "fade";
    pub const FADE_IN_UP: &str = "fade-in-up";
}

// -- Toggle targets --

pub fn like_button(offer_id: u64) -> Selector {
    Selector::attr_eq("data-offer-id", offer_id)
}

pub fn like_count(offer_id: u64) -> Selector {
    Selector::id(format!("like-count-{}", offer_id))
}

pub fn follow_business_button(business_id: u64) -> Selector {
    Selector::id(format!("follow-btn-{}", business_id))
}

pub fn followers_count(business_id: u64) -> Selector {
    Selector::id(format!("followers-count-{}", business_id))
}

pub fn follow_category_button(category_id: u64) -> Selector {
    Selector::id(format!("follow-cat-{}", category_id))
}

/// Vote scope: reviews or replies to reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteScope {
    Review,
    Reply,
}

impl VoteScope {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Reply => "reply",
        }
    }
}

/// `#review-like-{id}` / `#reply-dislike-{id}` and so on.
pub fn vote_button(scope: VoteScope, vote: crate::api::Vote, id: u64) -> Selector {
    Selector::id(format!("{}-{}-{}", scope.prefix(), vote.path_segment(), id))
}

/// `#review-likes-{id}` / `#reply-dislikes-{id}` and so on.
pub fn vote_count(scope: VoteScope, vote: crate::api::Vote, id: u64) -> Selector {
    Selector::id(format!("{}-{}s-{}", scope.prefix(), vote.path_segment(), id))
}

// -- Page chrome --

pub fn notification_badge() -> Selector {
    Selector::class("notification-badge")
}

pub fn search_input() -> Selector {
    Selector::id("search-input")
}

pub fn search_results() -> Selector {
    Selector::id("search-results")
}

pub fn expiring() -> Selector {
    Selector::has_attr(EXPIRES_AT_ATTR)
}

pub fn sidebar() -> Selector {
    Selector::class("sidebar")
}

pub fn sidebar_toggle() -> Selector {
    Selector::class("sidebar-toggle")
}

pub fn mobile_menu_toggle() -> Selector {
    Selector::class("mobile-menu-toggle")
}

pub fn sidebar_overlay() -> Selector {
    Selector::class("sidebar-overlay")
}

pub fn dashboard_content() -> Selector {
    Selector::class("dashboard-content")
}

pub fn alerts() -> Selector {
    Selector::class("alert")
}

pub fn permanent_alerts() -> Selector {
    Selector::class("alert-permanent")
}

pub fn tooltip_triggers() -> Selector {
    Selector::attr_eq(WIDGET_TOGGLE_ATTR, "tooltip")
}

pub fn popover_triggers() -> Selector {
    Selector::attr_eq(WIDGET_TOGGLE_ATTR, "popover")
}

/// Card-like elements revealed on scroll.
pub fn reveal_targets() -> [Selector; 2] {
    [Selector::class("card"), Selector::class("stat-card")]
}
