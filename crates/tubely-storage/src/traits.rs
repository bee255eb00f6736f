//! Storage abstraction trait
//!
//! This module defines the Storage trait that object store backends implement.

use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tubely_core::AppError;

use crate::reference::ObjectReference;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid object reference: {0}")]
    InvalidReference(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UploadFailed(msg) => AppError::UploadFailed(msg),
            StorageError::InvalidReference(msg) => AppError::InvalidObjectReference(msg),
            StorageError::SigningFailed(msg) => AppError::Internal(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Object store used for processed assets.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket new objects are written to.
    fn bucket(&self) -> &str;

    /// Stream a reader to `key` in [`Storage::bucket`].
    ///
    /// Returns only once the store has acknowledged the complete object.
    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<ObjectReference>;

    /// Generate a presigned GET URL granting read access to one object for `expires_in`.
    async fn presigned_get_url(
        &self,
        reference: &ObjectReference,
        expires_in: Duration,
    ) -> StorageResult<String>;
}
