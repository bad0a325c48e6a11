use indexmap::IndexMap;
use serde::Serialize;

/// Lower-cased footer path → item, in the order the paths first appear in
/// the document.
pub type FooterItems = IndexMap<String, FooterItem>;

/// One navigation line from a document's footer section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FooterItem {
    pub path: String,
    pub title: String,
    pub href: String,
    pub hidden: bool,
    pub redirect: Option<String>,
    /// Edit URL of the document the href points at, when it is a Google Doc.
    pub src: Option<String>,
}

impl FooterItem {
    /// Where a navigation link should point: external redirect first, then
    /// the site path.
    pub fn link_target(&self) -> &str {
        self.redirect.as_deref().unwrap_or(&self.path)
    }
}
