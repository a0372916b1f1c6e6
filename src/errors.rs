//! Error types for reqlab

use thiserror::Error;

/// Main error type for reqlab
#[derive(Error, Debug)]
pub enum ReqlabError {
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused: could not connect to {0}")]
    ConnectionRefused(String),

    #[error("Could not resolve host: {0}")]
    HostResolution(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Project has no saved requests: {0}")]
    EmptyCollection(String),
}

impl From<rquickjs::Error> for ReqlabError {
    fn from(err: rquickjs::Error) -> Self {
        ReqlabError::Script(format!("JavaScript error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ReqlabError>;
