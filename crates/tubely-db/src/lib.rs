//! Tubely metadata store
//!
//! The upload pipeline only ever reads a video record and patches its asset
//! references; records are created and deleted elsewhere. [`VideoRepository`]
//! is that narrow interface, with a PostgreSQL implementation for deployments
//! and an in-memory one for development and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use tubely_core::{AppError, Video};
use uuid::Uuid;

pub use memory::InMemoryVideoRepository;
pub use postgres::PgVideoRepository;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Video not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Metadata store unavailable: {0}")]
    Unavailable(String),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            other => AppError::Database(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Asset reference columns the pipeline may patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetField {
    VideoUrl,
    ThumbnailUrl,
}

impl AssetField {
    pub fn column(self) -> &'static str {
        match self {
            AssetField::VideoUrl => "video_url",
            AssetField::ThumbnailUrl => "thumbnail_url",
        }
    }
}

/// Read and patch access to video records.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a record by id; `Ok(None)` when it does not exist.
    async fn get_video(&self, id: Uuid) -> DbResult<Option<Video>>;

    /// Set one asset reference and bump `updated_at`, leaving every other
    /// column as the store currently has it. Returns the record as stored
    /// after the update.
    async fn set_asset_url(&self, id: Uuid, field: AssetField, url: &str) -> DbResult<Video>;

    /// All records owned by `user_id`, newest first.
    async fn list_videos(&self, user_id: Uuid) -> DbResult<Vec<Video>>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}
