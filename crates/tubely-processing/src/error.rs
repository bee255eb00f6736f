use thiserror::Error;
use tubely_db::DbError;
use tubely_storage::StorageError;

use crate::command::CommandError;

/// Failures raised by individual pipeline components.
///
/// Components do not know which pipeline stage they serve; the orchestrator
/// turns these into [`tubely_core::AppError`] through
/// [`crate::UploadStage::failure`].
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Invalid content type: {0}")]
    InvalidMediaType(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Upload exceeds the {limit_bytes} byte limit")]
    TooLarge { limit_bytes: u64 },

    #[error("Upload is empty")]
    EmptyUpload,

    #[error("Upload stream failed: {0}")]
    Stream(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Malformed {tool} output: {message}")]
    MalformedOutput { tool: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Record(#[from] DbError),
}

impl ProcessingError {
    /// Errors caused by the caller's input rather than by infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::InvalidMediaType(_)
                | ProcessingError::UnsupportedMediaType(_)
                | ProcessingError::TooLarge { .. }
                | ProcessingError::EmptyUpload
        )
    }
}
