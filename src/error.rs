//! Error type shared by the archive index and the virtual filesystem.
//!
//! Every variant is reported per request except [`Error::Format`] and
//! [`Error::Config`], which only occur while the configuration is built.

use std::io::SeekFrom;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A byte-size literal such as `"256M"` did not match the grammar.
    #[error("invalid size limit {input:?}: {reason}")]
    Format { input: String, reason: &'static str },

    /// Buffering mode refused to materialize an entry at or above the cap.
    #[error("{path}: entry size {size} exceeds maximum buffer size {limit}")]
    SizeLimitExceeded { path: String, size: u64, limit: u64 },

    /// Streaming handles only support rewinding to the start and asking for the size.
    #[error("{path}: unsupported seek {seek:?} on streaming entry")]
    UnsupportedSeek { path: String, seek: SeekFrom },

    #[error("{path}: file does not exist")]
    NotFound { path: String },

    #[error("{path}: invalid path")]
    InvalidPath { path: String },

    #[error("{path}: not a directory")]
    NotADirectory { path: String },

    #[error("{path}: is a directory")]
    IsADirectory { path: String },

    #[error("not a valid ZIP archive: {0}")]
    InvalidArchive(String),

    #[error("{path}: unsupported compression method {method}")]
    UnsupportedCompression { path: String, method: u16 },

    #[error("{path}: encrypted entries are not supported")]
    Encrypted { path: String },

    #[error("configuration error: {0}")]
    Config(String),

    /// Reads from the byte source, including corrupt or truncated entry data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn corrupt(path: &str, reason: impl std::fmt::Display) -> Self {
        Self::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{path}: corrupt entry data: {reason}"),
        ))
    }

    /// True for errors a file server should answer with "404 Not Found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidPath { .. } | Self::NotADirectory { .. }
        )
    }
}
