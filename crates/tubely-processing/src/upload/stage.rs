//! Per-upload state machine.
//!
//! An upload moves strictly forward through
//! `Received → Validated → Staged → [Remuxed → Inspected] → Uploaded → RecordUpdated → Done`,
//! the bracketed pair applying to videos only. The service error for a failed
//! component is derived from the stage that was being entered.

use std::fmt;
use tubely_core::AppError;

use crate::error::ProcessingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Validated,
    Staged,
    Remuxed,
    Inspected,
    Uploaded,
    RecordUpdated,
    Done,
}

impl UploadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStage::Received => "received",
            UploadStage::Validated => "validated",
            UploadStage::Staged => "staged",
            UploadStage::Remuxed => "remuxed",
            UploadStage::Inspected => "inspected",
            UploadStage::Uploaded => "uploaded",
            UploadStage::RecordUpdated => "record_updated",
            UploadStage::Done => "done",
        }
    }

    /// Service error for a component failure while entering this stage.
    pub fn failure(self, err: ProcessingError) -> AppError {
        if let ProcessingError::TooLarge { .. } = err {
            return AppError::PayloadTooLarge(err.to_string());
        }
        if err.is_client_error() {
            return AppError::InvalidInput(err.to_string());
        }

        let message = err.to_string();
        match self {
            UploadStage::Staged => AppError::StagingFailed(message),
            UploadStage::Remuxed => AppError::RemuxFailed(message),
            UploadStage::Inspected => AppError::InspectionFailed(message),
            UploadStage::Uploaded => AppError::UploadFailed(message),
            UploadStage::RecordUpdated => AppError::RecordUpdateFailed(message),
            UploadStage::Received | UploadStage::Validated | UploadStage::Done => {
                AppError::Internal(message)
            }
        }
    }

    /// Record the outcome of entering this stage.
    pub fn finish<T>(self, result: Result<T, ProcessingError>) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                tracing::debug!(stage = %self, "Upload stage reached");
                Ok(value)
            }
            Err(err) => {
                let app_error = self.failure(err);
                if app_error.is_client_error() {
                    tracing::debug!(stage = %self, error = %app_error, "Upload rejected");
                } else {
                    tracing::error!(stage = %self, error = %app_error, "Upload stage failed");
                }
                Err(app_error)
            }
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
