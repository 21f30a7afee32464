//! Markup fragments injected into buttons and the search dropdown.
//! Server-provided text is always escaped.

use std::fmt::Write;

use alloffers_types::api::SearchResult;

use crate::config::Locale;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`] for the entities it produces.
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Text content of a fragment: tags dropped, whitespace collapsed.
pub fn text_content(html: &str) -> String {
    let mut raw = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                raw.push(' ');
            }
            _ if !in_tag => raw.push(c),
            _ => {}
        }
    }
    unescape(&raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Font Awesome icon, `solid` (`fas`) or `regular` (`far`).
pub fn icon(name: &str, solid: bool) -> String {
    format!(r#"<i class="{} fa-{}"></i>"#, if solid { "fas" } else { "far" }, name)
}

pub fn like_button(liked: bool) -> String {
    icon("heart", liked)
}

pub fn follow_button(following: bool, locale: Locale) -> String {
    let strings = locale.strings();
    if following {
        format!("{} {}", icon("check", true), strings.following)
    } else {
        format!("{} {}", icon("plus", true), strings.follow)
    }
}

/// Ordered result list for the live-search dropdown.
pub fn search_results(results: &[SearchResult]) -> String {
    let mut html = String::from(r#"<div class="list-group">"#);
    for result in results {
        let _ = write!(
            html,
            r#"<a href="{}" class="list-group-item list-group-item-action"><i class="fas fa-{} me-2"></i><strong>{}</strong>"#,
            escape(&result.url),
            result.kind.icon(),
            escape(&result.title),
        );
        for extra in [&result.business, &result.description].into_iter().flatten() {
            let _ = write!(html, r#"<br><small class="text-muted">{}</small>"#, escape(extra));
        }
        html.push_str("</a>");
    }
    html.push_str("</div>");
    html
}

pub fn no_results(locale: Locale) -> String {
    format!(r#"<div class="p-3 text-muted">{}</div>"#, locale.strings().no_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloffers_types::api::ResultKind;

    fn result(kind: ResultKind, title: &str, business: Option<&str>, description: Option<&str>) -> SearchResult {
        SearchResult {
            kind,
            id: None,
            title: title.into(),
            url: "/offers/1/".into(),
            business: business.map(Into::into),
            description: description.map(Into::into),
        }
    }

    #[test]
    fn results_escape_server_text() {
        let html = search_results(&[result(ResultKind::Offer, "<script>x</script>", Some("A&B"), None)]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A&amp;B"));
        assert!(html.contains("fa-tag"));
    }

    #[test]
    fn optional_lines_only_when_present() {
        let html = search_results(&[result(ResultKind::Business, "Luigi", None, Some("Pizzeria"))]);
        assert_eq!(html.matches("<small").count(), 1);
        assert!(html.contains("fa-store"));
        assert_eq!(text_content(&html), "Luigi Pizzeria");
    }

    #[test]
    fn text_content_reverses_escaping() {
        assert_eq!(text_content("<b>Tom &amp; Jerry</b>  &lt;3"), "Tom & Jerry <3");
    }

    #[test]
    fn follow_label_is_localized() {
        assert_eq!(text_content(&follow_button(true, Locale::Es)), "Siguiendo");
        assert_eq!(text_content(&follow_button(false, Locale::En)), "Follow");
    }
}
