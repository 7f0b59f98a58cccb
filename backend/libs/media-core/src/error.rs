//! Error types for media streaming.

use std::path::PathBuf;
use thiserror::Error;

use crate::range::RangeError;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Backing file is absent (or is not a regular file).
    #[error("media file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The `Range` header could not be satisfied against the file.
    #[error("range not satisfiable for {total} bytes: {reason}")]
    RangeNotSatisfiable { total: u64, reason: RangeError },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MediaResult<T> = std::result::Result<T, MediaError>;
