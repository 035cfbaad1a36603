//! Error types for the ZPL writer

use thiserror::Error;

/// Writer, transport and render error types
#[derive(Debug, Error)]
pub enum ZplError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing or saving
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer or renderer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Text block justification code not recognised
    #[error("Invalid justification: {0:?} (expected left, center, right or justify)")]
    InvalidJustify(String),

    /// HTTP transport error talking to the render service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Render service answered with a non-200 status
    #[error("Render failed with status {status}: {body}")]
    Render { status: u16, body: String },

    /// Image could not be turned into a bitmap field
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Reasons an image directive was rejected
///
/// No directive is appended when any of these is returned.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Source or target dimensions are unusable
    #[error("Invalid image: {0}")]
    Validation(String),

    /// Remote image could not be downloaded
    #[error("Image fetch failed: {0}")]
    Fetch(String),

    /// Bytes could not be decoded as an image
    #[error("Image decode failed: {0}")]
    Decode(String),
}

/// Result type for writer operations
pub type ZplResult<T> = Result<T, ZplError>;
