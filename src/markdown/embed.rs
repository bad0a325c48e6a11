use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A pasted YouTube URL that Docs exported as `[url](url)`. The anchor may
/// carry markdown escapes, so the id is read from the link target.
static YOUTUBE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[https?://(?:www\.)?(?:youtu\.be/|youtube\.com/(?:embed/|watch\?v=))[\\a-z0-9_-]{11,12}[^\]]*\]\(https?://(?:www\.)?(?:youtu\.be/|youtube\.com/(?:embed/|watch\?v=))([a-z0-9_-]{11})[^)]*\)",
    )
    .unwrap()
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\s+").unwrap());

/// 16:9 responsive iframe for a YouTube video id.
pub fn youtube_embed(id: &str) -> String {
    format!(
        r#"
     <div
      class="video full-width"
      style="
        position: relative;
        padding-bottom: 56.25%;
        padding-top: 0.25em;
        height: 0;
      "
    >
      <iframe
        style="
          position: absolute;
          top: 0;
          left: 0;
          width: 100%;
          height: 100%;
        "
        src="https://www.youtube.com/embed/{id}"
        frameborder="0"
        allowfullscreen
      ></iframe>
    </div>"#
    )
}

/// Collapses runs of whitespace so the markup stays on one line inside the
/// markdown body.
pub fn collapse_whitespace(html: &str) -> String {
    WHITESPACE_RUN.replace_all(html, " ").into_owned()
}

pub fn rewrite_video_embeds(markdown: &str) -> String {
    YOUTUBE_LINK
        .replace_all(markdown, |caps: &Captures| {
            let id = caps[1].replace('\\', "");
            format!("\n\n{}\n", collapse_whitespace(&youtube_embed(&id)))
        })
        .into_owned()
}
