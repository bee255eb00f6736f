//! In-memory video records for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tubely_core::Video;
use uuid::Uuid;

use crate::{AssetField, DbError, DbResult, VideoRepository};

#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record. Record creation is outside the pipeline's remit.
    pub async fn insert(&self, video: Video) {
        self.videos.write().await.insert(video.id, video);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> DbResult<Option<Video>> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn set_asset_url(&self, id: Uuid, field: AssetField, url: &str) -> DbResult<Video> {
        let mut videos = self.videos.write().await;
        let video = videos.get_mut(&id).ok_or(DbError::NotFound(id))?;
        match field {
            AssetField::VideoUrl => video.video_url = Some(url.to_string()),
            AssetField::ThumbnailUrl => video.thumbnail_url = Some(url.to_string()),
        }
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn list_videos(&self, user_id: Uuid) -> DbResult<Vec<Video>> {
        let mut videos: Vec<Video> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}
