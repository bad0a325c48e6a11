//! HTML rendering for pages, footers and error pages.

use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{html, Options, Parser};

use crate::domain::{FooterItems, SitemapEntry};

const BASE_STYLE: &str = r#"body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
        }
        .markdown-body { padding: 2rem; max-width: 900px; margin: 0 auto; }
        .markdown-body img { max-width: 100%; }
        .footer-sections { display: flex; flex-wrap: wrap; justify-content: space-around; gap: 2rem; padding: 3rem 1.5rem; }
        .footer-section h2 { text-transform: capitalize; font-size: 1.1rem; }
        .footer-section ul { list-style: none; padding: 0; }"#;

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct FooterLink {
    pub title: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FooterSection {
    pub title: String,
    pub links: Vec<FooterLink>,
}

impl FooterSection {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            links: Vec::new(),
        }
    }
}

/// Groups visible footer items into sections.
///
/// Single-segment paths go to "Home" (except `/index`); deeper paths go to a
/// section named after their first segment with `-`/`_` read as spaces.
/// A "Contribute" section links to `edit_url`. Empty sections are dropped,
/// and there is no footer at all without footer items.
pub fn footer_sections(items: &FooterItems, edit_url: &str) -> Vec<FooterSection> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut sections = vec![FooterSection::new("Home")];
    for item in items.values().filter(|item| !item.hidden) {
        let segments: Vec<&str> = item.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(last) = segments.last() else {
            continue;
        };

        let link = FooterLink {
            title: if item.title.is_empty() {
                last.to_string()
            } else {
                item.title.clone()
            },
            href: item.link_target().to_string(),
        };

        match segments.as_slice() {
            ["index"] => {}
            [_] => sections[0].links.push(link),
            [first, ..] => {
                let name = first.replace(['-', '_'], " ");
                match sections.iter_mut().find(|s| s.title == name) {
                    Some(section) => section.links.push(link),
                    None => sections.push(FooterSection {
                        title: name,
                        links: vec![link],
                    }),
                }
            }
            [] => {}
        }
    }

    sections.push(FooterSection {
        title: "Contribute".to_string(),
        links: vec![FooterLink {
            title: "Edit this page".to_string(),
            href: edit_url.to_string(),
        }],
    });

    sections.retain(|s| !s.links.is_empty());
    sections
}

pub fn footer_html(sections: &[FooterSection]) -> String {
    if sections.is_empty() {
        return String::new();
    }

    let mut out = String::from("<footer class=\"footer\">\n<div class=\"footer-sections\">\n");
    for section in sections {
        let heading = if section.title == "Home" {
            "<a href=\"/\">Home</a>".to_string()
        } else {
            encode_text(&section.title).into_owned()
        };
        out.push_str(&format!(
            "<div class=\"footer-section\">\n<h2>{heading}</h2>\n<ul>\n"
        ));
        for link in &section.links {
            out.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                encode_double_quoted_attribute(&link.href),
                encode_text(&link.title)
            ));
        }
        out.push_str("</ul>\n</div>\n");
    }
    out.push_str("</div>\n</footer>\n");
    out
}

pub fn page_html(page: &SitemapEntry, body_markdown: &str, footer_items: &FooterItems) -> String {
    let body = markdown_to_html(body_markdown);
    let footer = footer_html(&footer_sections(footer_items, &page.src));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="alternate" type="application/rss+xml" title="RSS Feed" href="/feed.xml" />
    <link rel="stylesheet" href="/output.css" />
    <style>
        {BASE_STYLE}
    </style>
</head>
<body>
<div class="markdown-body">
{body}
</div>
{footer}</body>
</html>
"#,
        title = encode_text(&page.title),
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 2rem; background: #f8f9fa; }}
        .error-container {{ background: white; padding: 2rem; border-radius: 8px; text-align: center; }}
        .error-code {{ font-size: 4rem; color: #dc3545; margin: 0; }}
    </style>
</head>
<body>
    <div class="error-container">
        <h1 class="error-code">404</h1>
        <h2 class="error-title">{title}</h2>
        <p class="error-message">{message}</p>
        <a href="/" class="back-link">&larr; Go back home</a>
    </div>
</body>
</html>
"#,
        title = encode_text(title),
        message = encode_text(message),
    )
}
