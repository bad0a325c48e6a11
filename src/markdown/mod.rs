//! Page-time markdown transform.
//!
//! ```text
//! raw markdown → doc links → video embeds → body / footer split → footer items
//! ```
//!
//! The transform is pure: it reads the sitemap but never writes it, and it is
//! run fresh for every rendered page.

pub mod date;
pub mod embed;
pub mod footer;
pub mod images;
pub mod links;

pub use date::extract_date;
pub use embed::{rewrite_video_embeds, youtube_embed};
pub use footer::parse_footer;
pub use links::{google_doc_id, rewrite_doc_links};

use crate::domain::{FooterItems, Sitemap, SitemapEntry};

/// Inputs the transform needs besides the markdown itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Site path of the page being rendered, e.g. `/index`.
    pub current_path: &'a str,
    pub sitemap: &'a Sitemap,
}

#[derive(Debug)]
pub struct ProcessedMarkdown<'a> {
    /// Body markdown with the footer section removed.
    pub markdown: String,
    /// Sitemap entry for the current path. `None` means the page is not
    /// published; callers decide how to report that.
    pub page: Option<&'a SitemapEntry>,
    pub footer_items: FooterItems,
}

pub fn process_markdown<'a>(markdown: &str, ctx: RenderContext<'a>) -> ProcessedMarkdown<'a> {
    let rewritten = rewrite_doc_links(markdown, ctx.sitemap);
    let rewritten = rewrite_video_embeds(&rewritten);

    let (body, footer) = split_footer(&rewritten);
    let footer_items = parse_footer(footer);

    ProcessedMarkdown {
        markdown: body.to_string(),
        page: ctx.sitemap.get(ctx.current_path),
        footer_items,
    }
}

/// Splits at the last line consisting of exactly `---`. Without such a line
/// the whole text is body and the footer is empty.
pub fn split_footer(markdown: &str) -> (&str, &str) {
    let mut offset = 0;
    let mut delimiter = None;
    for line in markdown.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            delimiter = Some((offset, offset + line.len()));
        }
        offset += line.len();
    }

    match delimiter {
        Some((start, end)) => (&markdown[..start], &markdown[end..]),
        None => (markdown, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{google_doc_url, Sitemap, SitemapEntry};
    use crate::markdown::embed::collapse_whitespace;
    use chrono::Utc;

    const INDEX_MD: &str = "# Xavier Damman

Read [From Firms to Collectives](https://docs.google.com/document/d/1EYqqbQVkkPRjiDccN59LeXDH9LhksiUe3vNX8C-Y2DI/edit?tab=t.0).

And [a draft](https://docs.google.com/document/d/unpublishedDocId123/edit?usp=sharing).

---

Section break above stays in the body.

---

/about, About, /about
/projects/citizengarden, Citizen Garden, https://citizenspring.earth/citizengarden
/socials/twitter, [Twitter](https://x.com/xdamman)
(/twitter, https://x.com/xdamman)
(/blog/2017/from-firms-to-collectives, [From Firms to Collectives](https://docs.google.com/document/d/1EYqqbQVkkPRjiDccN59LeXDH9LhksiUe3vNX8C-Y2DI/edit?tab=t.0))
";

    fn sitemap() -> Sitemap {
        let mut sitemap = Sitemap::new();
        for (path, id, title) in [
            ("/index", "indexDocId", "Xavier Damman"),
            (
                "/blog/2017/from-firms-to-collectives",
                "1EYqqbQVkkPRjiDccN59LeXDH9LhksiUe3vNX8C-Y2DI",
                "From Firms to Collectives",
            ),
        ] {
            sitemap.insert(
                path.to_string(),
                SitemapEntry {
                    google_doc_id: id.to_string(),
                    path: path.to_string(),
                    src: google_doc_url(id),
                    ctime: Utc::now(),
                    mtime: Utc::now(),
                    ptime: Some(Utc::now()),
                    custom_date: None,
                    title: title.to_string(),
                    files: vec![],
                },
            );
        }
        sitemap
    }

    #[test]
    fn test_process_index_page() {
        let sitemap = sitemap();
        let out = process_markdown(
            INDEX_MD,
            RenderContext {
                current_path: "/index",
                sitemap: &sitemap,
            },
        );

        assert_eq!(out.page.map(|p| p.title.as_str()), Some("Xavier Damman"));
        assert!(out
            .markdown
            .contains("[From Firms to Collectives](/blog/2017/from-firms-to-collectives)"));
        assert!(out.markdown.contains(
            "[a draft](https://docs.google.com/document/d/unpublishedDocId123/edit?usp=sharing)"
        ));
        assert!(out.markdown.contains("Section break above stays in the body."));
        assert!(!out.markdown.contains("/socials/twitter"));

        let items = &out.footer_items;
        assert_eq!(items["/socials/twitter"].title, "Twitter");
        assert_eq!(items["/socials/twitter"].href, "https://x.com/xdamman");
        assert_eq!(items["/twitter"].redirect.as_deref(), Some("https://x.com/xdamman"));
        assert!(items["/twitter"].hidden);

        let post = &items["/blog/2017/from-firms-to-collectives"];
        assert_eq!(post.title, "From Firms to Collectives");
        assert_eq!(post.href, "/blog/2017/from-firms-to-collectives");
        assert!(post.redirect.is_none());
        assert!(post.hidden);

        assert!(!items["/projects/citizengarden"].hidden);
        assert_eq!(
            items["/projects/citizengarden"].redirect.as_deref(),
            Some("https://citizenspring.earth/citizengarden")
        );
        assert!(items["/about"].redirect.is_none());
        assert_eq!(items["/about"].href, "/about");
    }

    #[test]
    fn test_missing_page_entry_is_none() {
        let sitemap = sitemap();
        let out = process_markdown(
            "# Orphan",
            RenderContext {
                current_path: "/nowhere",
                sitemap: &sitemap,
            },
        );
        assert!(out.page.is_none());
        assert_eq!(out.markdown, "# Orphan");
        assert!(out.footer_items.is_empty());
    }

    #[test]
    fn test_embeds_are_rewritten_in_body() {
        let sitemap = Sitemap::new();
        let md = "Intro\n\n[https://youtu.be/UxLgJeUQS74](https://youtube.com/watch?v=UxLgJeUQS74)\n";
        let out = process_markdown(
            md,
            RenderContext {
                current_path: "/index",
                sitemap: &sitemap,
            },
        );
        assert!(out
            .markdown
            .contains(&collapse_whitespace(&youtube_embed("UxLgJeUQS74"))));
    }

    #[test]
    fn test_split_footer_uses_last_delimiter() {
        let (body, footer) = split_footer("a\n---\nb\n---\n/x, /y\n");
        assert_eq!(body, "a\n---\nb\n");
        assert_eq!(footer, "/x, /y\n");
    }

    #[test]
    fn test_split_footer_requires_exact_line() {
        let (body, footer) = split_footer("a\n----\n --- \nb");
        assert_eq!(body, "a\n----\n --- \nb");
        assert_eq!(footer, "");
    }

    #[test]
    fn test_split_footer_handles_crlf() {
        let (body, footer) = split_footer("a\r\n---\r\n/x, /y");
        assert_eq!(body, "a\r\n");
        assert_eq!(footer, "/x, /y");
    }
}
