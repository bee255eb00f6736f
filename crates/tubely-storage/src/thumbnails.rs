//! In-process thumbnail store, the degraded alternative to the object store.
//!
//! Thumbnails kept here live for the lifetime of the process and are served by
//! the public thumbnail retrieval endpoint. Not for production storage.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Thumbnail bytes and the media type they were uploaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub media_type: String,
    pub data: Bytes,
}

#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    async fn get(&self, video_id: Uuid) -> Option<Thumbnail>;

    /// Store a thumbnail, replacing any previous one for the same video.
    async fn put(&self, video_id: Uuid, thumbnail: Thumbnail);
}

#[derive(Clone, Default)]
pub struct MemoryThumbnailStore {
    thumbnails: Arc<Mutex<HashMap<Uuid, Thumbnail>>>,
}

impl MemoryThumbnailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.thumbnails.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.thumbnails.lock().await.is_empty()
    }
}

#[async_trait]
impl ThumbnailStore for MemoryThumbnailStore {
    async fn get(&self, video_id: Uuid) -> Option<Thumbnail> {
        self.thumbnails.lock().await.get(&video_id).cloned()
    }

    async fn put(&self, video_id: Uuid, thumbnail: Thumbnail) {
        tracing::debug!(
            video_id = %video_id,
            media_type = %thumbnail.media_type,
            size_bytes = thumbnail.data.len(),
            "Storing thumbnail in memory"
        );
        self.thumbnails.lock().await.insert(video_id, thumbnail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(data: &'static [u8]) -> Thumbnail {
        Thumbnail {
            media_type: "image/png".to_string(),
            data: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn test_put_replaces_previous() {
        let store = MemoryThumbnailStore::new();
        let id = Uuid::new_v4();
        assert!(store.get(id).await.is_none());

        store.put(id, png(b"first")).await;
        store.put(id, png(b"second")).await;

        assert_eq!(store.get(id).await, Some(png(b"second")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_puts_on_distinct_ids() {
        let store = MemoryThumbnailStore::new();
        let ids: Vec<Uuid> = (0..64).map(|_| Uuid::new_v4()).collect();

        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let store = store.clone();
                let id = *id;
                tokio::spawn(async move {
                    store
                        .put(
                            id,
                            Thumbnail {
                                media_type: "image/jpeg".to_string(),
                                data: Bytes::from(id.as_bytes().to_vec()),
                            },
                        )
                        .await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, ids.len());
        for id in ids {
            let thumbnail = store.get(id).await.unwrap();
            assert_eq!(thumbnail.data.as_ref(), id.as_bytes());
        }
    }
}
