//! Access URL issuance.
//!
//! Records store object references, never URLs with credentials in them.
//! Every read of a record for delivery goes through [`AccessUrlIssuer`],
//! which signs a fresh URL per stored reference.

use std::sync::Arc;
use std::time::Duration;
use tubely_core::{AppError, Video, VideoResponse};
use tubely_storage::{ObjectReference, Storage, StorageError};

#[derive(Clone)]
pub struct AccessUrlIssuer {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl AccessUrlIssuer {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    /// Sign a GET URL for one stored object, valid for the configured TTL.
    pub async fn url_for(&self, reference: &ObjectReference) -> Result<String, StorageError> {
        self.storage.presigned_get_url(reference, self.ttl).await
    }

    /// Turn a stored asset field into a deliverable URL.
    ///
    /// `http(s)://` values are stable URLs (in-process thumbnails) and pass
    /// through unchanged; anything else must decode as `bucket,key`.
    pub async fn resolve(&self, stored: &str) -> Result<String, StorageError> {
        if stored.starts_with("http://") || stored.starts_with("https://") {
            return Ok(stored.to_string());
        }
        let reference: ObjectReference = stored.parse()?;
        self.url_for(&reference).await
    }

    /// Record with fresh access URLs.
    ///
    /// A reference that cannot be resolved is dropped from the response and
    /// described in `url_error`; it never fails the whole record.
    pub async fn issue(&self, video: Video) -> VideoResponse {
        let video_id = video.id;
        let mut response = VideoResponse::from(video);
        let mut failures = Vec::new();

        for (field, slot) in [
            ("video_url", &mut response.video_url),
            ("thumbnail_url", &mut response.thumbnail_url),
        ] {
            let Some(stored) = slot.take() else {
                continue;
            };
            match self.resolve(&stored).await {
                Ok(url) => *slot = Some(url),
                Err(err) => {
                    let err = AppError::from(err);
                    tracing::warn!(
                        video_id = %video_id,
                        field = field,
                        error = %err,
                        "Failed to issue access URL"
                    );
                    failures.push(format!("{}: {}", field, err));
                }
            }
        }

        if !failures.is_empty() {
            response.url_error = Some(failures.join("; "));
        }
        response
    }

    /// [`AccessUrlIssuer::issue`] for each record, preserving order.
    pub async fn issue_all(&self, videos: Vec<Video>) -> Vec<VideoResponse> {
        futures::future::join_all(videos.into_iter().map(|video| self.issue(video))).await
    }
}
