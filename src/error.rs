use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error during {operation}: {source}")]
    Http {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GitHub API returned HTTP {status} during {operation}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Template error: {0}")]
    Template(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn http(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Http {
            operation: operation.into(),
            source,
        }
    }
}
