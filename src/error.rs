use thiserror::Error;

pub type PageResult<T> = Result<T, PageError>;

/// Errors surfaced to the host.
///
/// Data-quality problems in a page description never show up here: unknown
/// sections are dropped, oversized values are clamped and unsafe values are
/// neutralized. Only host misuse and I/O-level failures become errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("Session requires a mount target")]
    MissingMount,

    #[error("Invalid mount target '{id}': {reason}")]
    InvalidMount { id: String, reason: String },

    #[error("Section index {index} out of range (section count {count})")]
    SectionIndexOutOfRange { index: usize, count: usize },

    #[error("Session has been destroyed")]
    Destroyed,

    #[error("No node at path {path:?}")]
    InvalidEventTarget { path: Vec<usize> },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for PageError {
    fn from(err: serde_json::Error) -> Self {
        PageError::Json(err.to_string())
    }
}

impl From<std::io::Error> for PageError {
    fn from(err: std::io::Error) -> Self {
        PageError::Io(err.to_string())
    }
}
