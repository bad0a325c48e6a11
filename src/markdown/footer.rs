//! Footer navigation parsing.
//!
//! The footer section holds one navigation entry per line:
//!
//! ```text
//! /path, title, href
//! /path, [title](href)
//! /path, href
//! (/path, title, href)      hidden: resolvable but not listed
//! ```
//!
//! Lines that neither start with `/` nor are wrapped in parentheses are
//! ordinary text and ignored. Columns past the third are dropped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{google_doc_url, FooterItem, FooterItems};
use crate::markdown::links::google_doc_id;

static BRACKET_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\]\((.*)\)$").unwrap());

static EXTERNAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?://|mailto:)").unwrap());

/// Parses every navigation line of `footer`. A later line with the same path
/// replaces an earlier one but keeps its position.
pub fn parse_footer(footer: &str) -> FooterItems {
    let mut items = FooterItems::new();
    for line in footer.lines() {
        if let Some(item) = parse_footer_line(line) {
            items.insert(item.path.clone(), item);
        }
    }
    items
}

pub fn parse_footer_line(line: &str) -> Option<FooterItem> {
    let line = line.trim();

    let (line, hidden) = match line.strip_prefix('(').and_then(|l| l.strip_suffix(')')) {
        Some(inner) => (inner, true),
        None if line.starts_with('/') => (line, false),
        None => return None,
    };

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    let (path, mut title, href) = match parts.as_slice() {
        [] | [_] => return None,
        [path, href] => (*path, String::new(), *href),
        [path, title, href, rest @ ..] => {
            if !rest.is_empty() {
                debug!(line, dropped = rest.len(), "Footer line has extra columns");
            }
            (*path, title.to_string(), *href)
        }
    };

    let mut href = href.to_string();
    if let Some(caps) = BRACKET_LINK.captures(&href) {
        if title.is_empty() {
            title = caps[1].to_string();
        }
        href = caps[2].to_string();
    }

    let mut src = None;
    let mut redirect = None;
    if let Some(doc_id) = google_doc_id(&href) {
        src = Some(google_doc_url(doc_id));
    } else if EXTERNAL_URL.is_match(&href) {
        redirect = Some(href.clone());
    }

    Some(FooterItem {
        path: path.to_lowercase(),
        title,
        href,
        hidden,
        redirect,
        src,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_columns_with_external_href() {
        let item = parse_footer_line("/a, Title, https://x.com/y").unwrap();
        assert_eq!(item.path, "/a");
        assert_eq!(item.title, "Title");
        assert_eq!(item.href, "https://x.com/y");
        assert_eq!(item.redirect.as_deref(), Some("https://x.com/y"));
        assert!(!item.hidden);
        assert!(item.src.is_none());
    }

    #[test]
    fn test_parenthesized_line_is_hidden() {
        let item = parse_footer_line("(/a, https://x.com/y)").unwrap();
        assert!(item.hidden);
        assert_eq!(item.path, "/a");
        assert_eq!(item.redirect.as_deref(), Some("https://x.com/y"));
    }

    #[test]
    fn test_two_entry_footer() {
        let items = parse_footer(
            "/about, About us, https://example.com/about\n(/x, Hidden, https://example.com/x)",
        );
        assert_eq!(items.len(), 2);

        let about = &items["/about"];
        assert_eq!(about.title, "About us");
        assert_eq!(about.redirect.as_deref(), Some("https://example.com/about"));
        assert!(!about.hidden);

        let hidden = &items["/x"];
        assert_eq!(hidden.title, "Hidden");
        assert_eq!(hidden.redirect.as_deref(), Some("https://example.com/x"));
        assert!(hidden.hidden);
    }

    #[test]
    fn test_bracket_link_supplies_title() {
        let item = parse_footer_line("/socials/twitter, [Twitter](https://x.com/xdamman)").unwrap();
        assert_eq!(item.title, "Twitter");
        assert_eq!(item.href, "https://x.com/xdamman");
        assert_eq!(item.redirect.as_deref(), Some("https://x.com/xdamman"));
    }

    #[test]
    fn test_explicit_title_wins_over_bracket_title() {
        let item = parse_footer_line("/a, Mine, [Theirs](/a)").unwrap();
        assert_eq!(item.title, "Mine");
        assert_eq!(item.href, "/a");
        assert!(item.redirect.is_none());
    }

    #[test]
    fn test_google_doc_href_sets_src_not_redirect() {
        let item =
            parse_footer_line("/doc, Doc, https://docs.google.com/document/d/abc123/edit?usp=sharing")
                .unwrap();
        assert_eq!(
            item.src.as_deref(),
            Some("https://docs.google.com/document/d/abc123/edit")
        );
        assert!(item.redirect.is_none());
    }

    #[test]
    fn test_mailto_is_redirect() {
        let item = parse_footer_line("/contact, mailto:hi@example.com").unwrap();
        assert_eq!(item.redirect.as_deref(), Some("mailto:hi@example.com"));
        assert_eq!(item.title, "");
    }

    #[test]
    fn test_path_is_lowercased() {
        let item = parse_footer_line("/Projects/CitizenGarden, Garden, /projects/x").unwrap();
        assert_eq!(item.path, "/projects/citizengarden");
    }

    #[test]
    fn test_single_column_lines_are_skipped() {
        assert!(parse_footer_line("/").is_none());
        assert!(parse_footer_line("/foo").is_none());
        assert!(parse_footer_line("()").is_none());
    }

    #[test]
    fn test_non_navigation_lines_are_skipped() {
        assert!(parse_footer_line("Some closing words, with a comma").is_none());
        assert!(parse_footer_line("").is_none());
        assert!(parse_footer_line("   ").is_none());
    }

    #[test]
    fn test_extra_columns_are_dropped() {
        let item = parse_footer_line("/a, Title, /target, extra, more").unwrap();
        assert_eq!(item.title, "Title");
        assert_eq!(item.href, "/target");
    }

    #[test]
    fn test_later_line_overwrites_same_path() {
        let items = parse_footer("/a, First, /one\n/A, Second, /two");
        assert_eq!(items.len(), 1);
        assert_eq!(items["/a"].title, "Second");
        assert_eq!(items["/a"].href, "/two");
    }

    #[test]
    fn test_items_keep_document_order() {
        let items = parse_footer("/zeta, Zeta, /zeta\n/alpha, Alpha, /alpha\n/ZETA, Zeta 2, /z2");
        let paths: Vec<&str> = items.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/zeta", "/alpha"]);
        assert_eq!(items["/zeta"].title, "Zeta 2");
    }
}
