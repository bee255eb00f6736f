use async_trait::async_trait;
use tubely_core::Video;
use tubely_db::{AssetField, DbError, DbResult, InMemoryVideoRepository, VideoRepository};
use uuid::Uuid;

/// Reads from an in-memory store; every update fails.
pub struct FailingUpdateRepository {
    inner: InMemoryVideoRepository,
}

impl FailingUpdateRepository {
    pub fn new(inner: InMemoryVideoRepository) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl VideoRepository for FailingUpdateRepository {
    async fn get_video(&self, id: Uuid) -> DbResult<Option<Video>> {
        self.inner.get_video(id).await
    }

    async fn set_asset_url(&self, _id: Uuid, _field: AssetField, _url: &str) -> DbResult<Video> {
        Err(DbError::Unavailable("injected update failure".to_string()))
    }

    async fn list_videos(&self, user_id: Uuid) -> DbResult<Vec<Video>> {
        self.inner.list_videos(user_id).await
    }
}
