//! Error types for unhtml library.

use std::io;
use thiserror::Error;

/// Result type alias for unhtml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during HTML processing.
///
/// Most anomalies inside a document (undetectable encodings, malformed
/// markup, odd table structure) are absorbed by the stage that finds them
/// and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No handler is registered for the requested format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The payload could not be recognized as any supported format.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The declared encoding label is not known.
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid configuration supplied by the caller.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A page URL could not serve as a base for its links.
    #[error("Link error: {0}")]
    Link(#[from] crate::crawl::LinkError),

    /// A spawned task did not complete.
    #[error("Task failed: {0}")]
    Task(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
