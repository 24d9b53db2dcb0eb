//! Error handling for irquad
//!
//! Every error that concerns a file carries its path so the offending
//! file can be identified from the message alone.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for irquad operations
pub type Result<T> = std::result::Result<T, IrError>;

/// Main error type for irquad operations
#[derive(Error, Debug)]
pub enum IrError {
    /// The file is not a well-formed WAV container we can handle
    #[error("Invalid WAV file {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    /// Left and right halves of a pair cannot be combined
    #[error("Mismatched parameters for '{base_name}': {details}")]
    ParameterMismatch { base_name: String, details: String },

    /// In-memory frame data does not fit the requested channel layout
    #[error("Invalid channel layout: {reason}")]
    Layout { reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl IrError {
    pub(crate) fn format(path: &Path, reason: impl Into<String>) -> Self {
        IrError::Format {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        IrError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Map a hound error for `path` onto our error kinds.
    ///
    /// A short read means the container lied about its own size, which is
    /// a format problem rather than a filesystem one.
    pub(crate) fn from_hound(path: &Path, err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                IrError::format(path, "truncated file")
            }
            hound::Error::IoError(e) => IrError::io(path, e),
            other => IrError::format(path, other.to_string()),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            IrError::Format { .. } => "FORMAT_ERROR",
            IrError::ParameterMismatch { .. } => "PARAMETER_MISMATCH",
            IrError::Layout { .. } => "LAYOUT_ERROR",
            IrError::Io { .. } => "IO_ERROR",
            IrError::Walk(_) => "WALK_ERROR",
        }
    }

    /// Check if this error only affects one pair and the run may continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IrError::ParameterMismatch { .. })
    }

    /// Path of the file this error concerns, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            IrError::Format { path, .. } | IrError::Io { path, .. } => Some(path),
            IrError::Walk(e) => e.path(),
            _ => None,
        }
    }
}
