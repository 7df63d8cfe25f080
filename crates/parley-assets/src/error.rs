//! Asset provisioning error types.
//!
//! All provisioning operations return [`Result<T>`] which uses
//! [`AssetError`] as the error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while materializing a model asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset is not present on disk where it was expected.
    #[error("asset missing: {}", .0.display())]
    Missing(PathBuf),

    /// The asset file exists but is zero-length.
    #[error("asset is empty: {}", .0.display())]
    Empty(PathBuf),

    /// The network transfer failed (non-success status, broken connection).
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// The transfer ended before the advertised length was received.
    #[error("incomplete transfer: expected {expected} bytes, got {actual}")]
    IncompleteTransfer {
        /// Bytes the server advertised.
        expected: u64,
        /// Bytes actually received.
        actual: u64,
    },

    /// The downloaded archive could not be extracted.
    #[error("archive extraction failed: {0}")]
    Archive(String),

    /// An HTTP-level error from reqwest.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error while writing or inspecting the cache.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing() {
        let err = AssetError::Missing(PathBuf::from("/cache/model.gguf"));
        assert_eq!(err.to_string(), "asset missing: /cache/model.gguf");
    }

    #[test]
    fn display_empty() {
        let err = AssetError::Empty(PathBuf::from("/cache/model.gguf"));
        assert_eq!(err.to_string(), "asset is empty: /cache/model.gguf");
    }

    #[test]
    fn display_transfer() {
        let err = AssetError::Transfer("HTTP 503: https://example.com".into());
        assert_eq!(err.to_string(), "transfer failed: HTTP 503: https://example.com");
    }

    #[test]
    fn display_incomplete_transfer() {
        let err = AssetError::IncompleteTransfer {
            expected: 100,
            actual: 42,
        };
        assert_eq!(
            err.to_string(),
            "incomplete transfer: expected 100 bytes, got 42"
        );
    }

    #[test]
    fn display_archive() {
        let err = AssetError::Archive("invalid central directory".into());
        assert_eq!(
            err.to_string(),
            "archive extraction failed: invalid central directory"
        );
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = AssetError::from(io_err);
        assert!(matches!(err, AssetError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
