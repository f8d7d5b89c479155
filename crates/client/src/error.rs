use domain::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("element '{0}' not found")]
    MissingElement(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Failures a controller reports to the user. None of them is fatal; the
/// form stays editable and can be resubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{message}")]
    Validation {
        field_id: &'static str,
        message: &'static str,
    },
    #[error("status {0}")]
    TransportStatus(u16),
    #[error("{0}")]
    TransportException(String),
}

impl From<PageError> for ClientError {
    fn from(e: PageError) -> Self {
        ClientError::TransportException(e.to_string())
    }
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        ClientError::TransportException(e.to_string())
    }
}

impl From<ProtocolError> for ClientError {
    fn from(e: ProtocolError) -> Self {
        ClientError::TransportException(e.to_string())
    }
}
