use std::fmt;

use crate::dom::Selector;

/// CSS `display` values components switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
    Flex,
}

impl Display {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Block => "block",
            Self::Flex => "flex",
        }
    }
}

/// Third-party widgets activated on page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Tooltip,
    Popover,
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

/// A single DOM mutation. Handlers describe what should change; a rendering
/// adapter decides how. Patches whose target matches nothing are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Replace text content.
    SetText { target: Selector, text: String },
    /// Replace inner markup.
    SetHtml { target: Selector, html: String },
    /// Add (`on`) or remove a class.
    SetClass { target: Selector, class: &'static str, on: bool },
    /// Set the inline `display` style.
    SetDisplay { target: Selector, display: Display },
    /// Activate a widget on the element.
    AttachWidget { target: Selector, widget: Widget },
    /// Detach the element from the document.
    Remove { target: Selector },
    /// Show a transient message to the user.
    Notify { level: NoticeLevel, message: String },
    /// Leave the page.
    Navigate { url: String },
}

impl Patch {
    pub fn text(target: Selector, text: impl Into<String>) -> Self {
        Self::SetText { target, text: text.into() }
    }

    pub fn html(target: Selector, html: impl Into<String>) -> Self {
        Self::SetHtml { target, html: html.into() }
    }

    pub fn class(target: Selector, class: &'static str, on: bool) -> Self {
        Self::SetClass { target, class, on }
    }

    pub fn add_class(target: Selector, class: &'static str) -> Self {
        Self::class(target, class, true)
    }

    pub fn remove_class(target: Selector, class: &'static str) -> Self {
        Self::class(target, class, false)
    }

    pub fn display(target: Selector, display: Display) -> Self {
        Self::SetDisplay { target, display }
    }

    pub fn notify(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self::Notify { level, message: message.into() }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate { url: url.into() }
    }

    /// Element the patch addresses; `None` for page-level patches.
    pub fn target(&self) -> Option<&Selector> {
        match self {
            Self::SetText { target, .. }
            | Self::SetHtml { target, .. }
            | Self::SetClass { target, .. }
            | Self::SetDisplay { target, .. }
            | Self::AttachWidget { target, .. }
            | Self::Remove { target } => Some(target),
            Self::Notify { .. } | Self::Navigate { .. } => None,
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetText { target, text } => write!(f, "set_text target={} text={:?}", target, text),
            Self::SetHtml { target, html } => write!(f, "set_html target={} bytes={}", target, html.len()),
            Self::SetClass { target, class, on } => {
                let op = if *on { "add_class" } else { "remove_class" };
                write!(f, "{} target={} class={}", op, target, class)
            }
            Self::SetDisplay { target, display } => {
                write!(f, "set_display target={} display={}", target, display.as_css())
            }
            Self::AttachWidget { target, widget } => write!(f, "attach_widget target={} widget={:?}", target, widget),
            Self::Remove { target } => write!(f, "remove target={}", target),
            Self::Notify { level, message } => write!(f, "notify level={:?} message={:?}", level, message),
            Self::Navigate { url } => write!(f, "navigate url={}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    #[test]
    fn display_is_one_line_per_patch() {
        let patch = Patch::add_class(dom::like_button(5), dom::class::LIKED);
        assert_eq!(patch.to_string(), r#"add_class target=[data-offer-id="5"] class=liked"#);

        let patch = Patch::display(dom::notification_badge(), Display::None);
        assert_eq!(patch.to_string(), "set_display target=.notification-badge display=none");
    }

    #[test]
    fn page_level_patches_have_no_target() {
        assert!(Patch::navigate("/login/").target().is_none());
        assert_eq!(Patch::text(dom::like_count(1), "3").target(), Some(&dom::like_count(1)));
    }
}
