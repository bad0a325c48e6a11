use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuireError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, QuireError>;
