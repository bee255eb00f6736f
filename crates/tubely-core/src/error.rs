//! Error types module
//!
//! All failures surfaced by the upload pipeline and the read path are unified
//! under [`AppError`]. Each variant describes its own HTTP presentation through
//! [`ErrorMetadata`], so handlers never pick status codes by hand.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Caller mistakes worth noticing (auth failures)
    Warn,
    /// Infrastructure or tool failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether the caller may retry the whole request
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Staging failed: {0}")]
    StagingFailed(String),

    #[error("Inspection failed: {0}")]
    InspectionFailed(String),

    #[error("Remux failed: {0}")]
    RemuxFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Record update failed: {0}")]
    RecordUpdateFailed(String),

    #[error("Invalid object reference: {0}")]
    InvalidObjectReference(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid ID: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Upload a smaller file"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Provide a valid bearer token"),
            false,
            LogLevel::Warn,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            None,
            false,
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, None, false, LogLevel::Debug),
        AppError::StagingFailed(_) => (
            500,
            "STAGING_FAILED",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::InspectionFailed(_) => (
            500,
            "INSPECTION_FAILED",
            true,
            Some("Retry the upload with a valid MP4 file"),
            true,
            LogLevel::Error,
        ),
        AppError::RemuxFailed(_) => (
            500,
            "REMUX_FAILED",
            true,
            Some("Retry the upload with a valid MP4 file"),
            true,
            LogLevel::Error,
        ),
        AppError::UploadFailed(_) => (
            500,
            "UPLOAD_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::RecordUpdateFailed(_) => (
            500,
            "RECORD_UPDATE_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidObjectReference(_) => (
            500,
            "INVALID_OBJECT_REFERENCE",
            false,
            Some("Re-upload the asset"),
            true,
            LogLevel::Error,
        ),
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Unauthorized(_) => "Authentication required".to_string(),
            AppError::Forbidden(_) => "You do not own this video".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::StagingFailed(_) => "Failed to receive the uploaded file".to_string(),
            AppError::InspectionFailed(_) => "Failed to inspect the uploaded video".to_string(),
            AppError::RemuxFailed(_) => "Failed to prepare the video for playback".to_string(),
            AppError::UploadFailed(_) => "Failed to store the uploaded file".to_string(),
            AppError::RecordUpdateFailed(_) => "Failed to update the video record".to_string(),
            AppError::InvalidObjectReference(_) => {
                "Stored object reference is invalid".to_string()
            }
            AppError::Database(_) => "Failed to load the video record".to_string(),
            AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }
}

impl AppError {
    /// Variant name, used as `error_type` in responses and logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::StagingFailed(_) => "StagingFailed",
            AppError::InspectionFailed(_) => "InspectionFailed",
            AppError::RemuxFailed(_) => "RemuxFailed",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::RecordUpdateFailed(_) => "RecordUpdateFailed",
            AppError::InvalidObjectReference(_) => "InvalidObjectReference",
            AppError::Database(_) => "Database",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Caller mistakes (4xx) as opposed to service failures.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }

    /// Full internal message, only exposed outside production.
    pub fn detailed_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(AppError::InvalidInput("x".into()).http_status_code(), 400);
        assert_eq!(AppError::PayloadTooLarge("x".into()).http_status_code(), 413);
        assert_eq!(AppError::Unauthorized("x".into()).http_status_code(), 401);
        assert_eq!(AppError::Forbidden("x".into()).http_status_code(), 403);
        assert_eq!(AppError::NotFound("x".into()).http_status_code(), 404);
    }

    #[test]
    fn pipeline_failures_are_retriable_server_errors() {
        for err in [
            AppError::StagingFailed("disk".into()),
            AppError::InspectionFailed("probe".into()),
            AppError::RemuxFailed("ffmpeg".into()),
            AppError::UploadFailed("s3".into()),
            AppError::RecordUpdateFailed("db".into()),
        ] {
            assert_eq!(err.http_status_code(), 500, "{}", err);
            assert!(err.is_recoverable(), "{}", err);
            assert!(err.is_sensitive(), "{}", err);
            assert_eq!(err.log_level(), LogLevel::Error);
        }
    }

    #[test]
    fn client_messages_do_not_leak_internals() {
        let err = AppError::UploadFailed("bucket secret-bucket unreachable".to_string());
        assert!(!err.client_message().contains("secret-bucket"));
        assert_eq!(err.error_code(), "UPLOAD_FAILED");

        let err = AppError::Unauthorized("token expired at 12:00".to_string());
        assert_eq!(err.client_message(), "Authentication required");
    }

    #[test]
    fn uuid_errors_are_invalid_input() {
        let err: AppError = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
