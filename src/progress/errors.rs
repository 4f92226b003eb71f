use thiserror::Error;

/// Errors that can arise while persisting or restoring player progression.
///
/// None of these are fatal: the in-memory [`crate::progress::Progression`] keeps
/// working after any of them and the worst outcome is progress that was not
/// durably written.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (directory creation, file locks, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 encoding error in a stored document.
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The mutation was applied in memory but the write-through save failed.
    /// Call [`crate::progress::Progression::save`] to retry.
    #[error("progress not saved: {0}")]
    Unsaved(Box<ProgressError>),

    /// The backend refused the write (e.g. quota exhausted, storage unavailable).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Unknown backend name or otherwise unusable store settings.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl ProgressError {
    /// True when the error came from a failed write-through save, meaning the
    /// in-memory state is ahead of what is on disk.
    pub fn is_unsaved(&self) -> bool {
        matches!(self, ProgressError::Unsaved(_))
    }
}
