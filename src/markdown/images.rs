//! Inline images in Docs markdown exports.
//!
//! Docs exports images as reference definitions holding a base64 data URI,
//! `[image1]: <data:image/png;base64,...>`, referenced from the body as
//! `![][image1]`. These helpers find the definitions and relink the body to
//! files on disk; writing the files is the downloader's job.

use std::sync::LazyLock;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use regex::Regex;

use crate::app::{QuireError, Result};

static IMAGE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)\[([^\]]+)\]: ?<data:image/(png|gif|jpg|jpeg);base64,([^>]+)>").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// Reference label, e.g. `image1`.
    pub alt: String,
    pub extension: String,
    /// The whole reference definition as it appears in the markdown.
    pub definition: String,
    base64: String,
}

impl InlineImage {
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64_STANDARD
            .decode(self.base64.trim())
            .map_err(|e| QuireError::Other(format!("Invalid base64 image {}: {e}", self.alt)))
    }

    /// `{prefix}_{alt}.{ext}`
    pub fn file_name(&self, prefix: &str) -> String {
        let alt = if self.alt.is_empty() { "image" } else { &self.alt };
        format!("{prefix}_{alt}.{}", self.extension)
    }
}

pub fn find_inline_images(markdown: &str) -> Vec<InlineImage> {
    IMAGE_DEFINITION
        .captures_iter(markdown)
        .map(|caps| InlineImage {
            alt: caps[1].to_string(),
            extension: caps[2].to_ascii_lowercase(),
            definition: caps[0].to_string(),
            base64: caps[3].to_string(),
        })
        .collect()
}

/// Drops the image's data definition and points its references at
/// `relative_path`.
pub fn relink_image(markdown: &str, image: &InlineImage, relative_path: &str) -> String {
    markdown.replacen(&image.definition, "", 1).replace(
        &format!("![][{}]", image.alt),
        &format!("![{}]({relative_path})", image.alt),
    )
}
