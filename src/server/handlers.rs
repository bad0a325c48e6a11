use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::markdown::{process_markdown, RenderContext};
use crate::server::error::ServerError;
use crate::server::feed::build_feed;
use crate::server::render::page_html;
use crate::server::AppState;
use crate::store::SitemapStore;

const CSS_CONTENT_TYPE: &str = "text/css; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub(crate) async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(crate) async fn health() -> &'static str {
    "OK"
}

pub(crate) async fn stylesheet(State(state): State<Arc<AppState>>) -> Response {
    let css = tokio::fs::read(state.config.data_dir.join("output.css"))
        .await
        .unwrap_or_default();
    (
        [
            (header::CONTENT_TYPE, CSS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        css,
    )
        .into_response()
}

pub(crate) async fn feed(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let host = request_host(&headers, &state.config.default_host)?;
    let sitemap = state.store.load_sitemap(&host)?;
    let xml = build_feed(
        &host,
        &sitemap,
        &state.config.host_dir(&host),
        &state.config.sync.blog_prefix,
    )
    .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        xml,
    )
        .into_response())
}

/// Serves `{data_dir}/{host}/{slug}`: markdown is rendered to a page, other
/// files are sent as is.
pub(crate) async fn page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ServerError> {
    let host = request_host(&headers, &state.config.default_host)?;
    let slug = request_slug(uri.path()).ok_or_else(|| ServerError::PageNotFound {
        host: host.clone(),
        slug: uri.path().to_string(),
    })?;
    let host_dir = state.config.host_dir(&host);
    let file = file_path(&host_dir, &slug);

    let is_file = tokio::fs::metadata(&file)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        let host_exists = tokio::fs::metadata(&host_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        return Err(if host_exists {
            ServerError::PageNotFound { host, slug }
        } else {
            ServerError::HostNotFound(host)
        });
    }

    let bytes = tokio::fs::read(&file).await?;
    let content_type = content_type(&file);
    if content_type != "text/markdown" {
        return Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response());
    }

    let markdown = String::from_utf8_lossy(&bytes);
    let sitemap = state.store.load_sitemap(&host)?;
    let current_path = format!("/{}", slug.trim_end_matches(".md"));
    let processed = process_markdown(
        &markdown,
        RenderContext {
            current_path: &current_path,
            sitemap: &sitemap,
        },
    );
    let Some(page) = processed.page else {
        debug!(host = %host, path = %current_path, "Markdown file has no sitemap entry");
        return Err(ServerError::PageNotFound { host, slug });
    };

    let html = page_html(page, &processed.markdown, &processed.footer_items);
    let etag = compute_etag(&html);
    if headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|v| v.as_bytes() == etag.as_bytes())
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, HTML_CONTENT_TYPE.to_string()),
            (header::ETAG, etag),
        ],
        html,
    )
        .into_response())
}

/// Host the request is for. `localhost` maps to the default host; anything
/// that could escape the data directory is rejected.
fn request_host(headers: &HeaderMap, default_host: &str) -> Result<String, ServerError> {
    let raw = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let host = strip_port(raw).to_ascii_lowercase();

    if host.is_empty() || host == "localhost" {
        return Ok(default_host.to_string());
    }

    let valid = !host.starts_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(host)
    } else {
        Err(ServerError::HostNotFound(host))
    }
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Path without surrounding slashes, `index` when empty. `None` for paths
/// with `.`/`..` or empty segments.
fn request_slug(path: &str) -> Option<String> {
    let slug = path.trim_matches('/');
    if slug.is_empty() {
        return Some("index".to_string());
    }
    if slug
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return None;
    }
    Some(slug.to_string())
}

/// `.md` is appended when the slug has no extension.
fn file_path(host_dir: &Path, slug: &str) -> PathBuf {
    let path = host_dir.join(slug);
    if path.extension().is_some() {
        path
    } else {
        host_dir.join(format!("{slug}.md"))
    }
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "html" => HTML_CONTENT_TYPE,
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        _ => "application/octet-stream",
    }
}

/// Quoted hex SHA-256 of the rendered page.
fn compute_etag(content: &str) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(content.as_bytes())))
}
