use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::app::QuireError;
use crate::server::render::error_page;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Host not found: {0}")]
    HostNotFound(String),

    #[error("Page not found: {host}/{slug}")]
    PageNotFound { host: String, slug: String },

    #[error(transparent)]
    Internal(#[from] QuireError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let html_page = |title: &str, message: String| {
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                error_page(title, &message),
            )
                .into_response()
        };

        match self {
            Self::HostNotFound(host) => html_page(
                "Host Not Found",
                format!(
                    "The host \"{host}\" was not found. Please check the URL or contact the administrator."
                ),
            ),
            Self::PageNotFound { host, slug } => html_page(
                "Page Not Found",
                format!("The page \"{slug}\" was not found on {host}."),
            ),
            Self::Internal(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::Io(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
