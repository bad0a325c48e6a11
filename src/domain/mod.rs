pub mod document;
pub mod footer;
pub mod sitemap;

pub use document::{google_doc_url, sanitize_segment, Author, DocMetadata, DownloadedDoc, Folder};
pub use footer::{FooterItem, FooterItems};
pub use sitemap::{find_by_doc_id, Sitemap, SitemapEntry};
