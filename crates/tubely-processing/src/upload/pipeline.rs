//! Pipeline orchestrator.
//!
//! One [`UploadPipeline`] call handles one upload end to end: ownership check,
//! validation, staging, the video-only remux and inspection, upload, and the
//! record update. Every staged file is removed before the call returns,
//! whatever the outcome.

use bytes::Bytes;
use futures::Stream;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tubely_core::constants::{THUMBNAIL_KEY_PREFIX, THUMBNAIL_ROUTE_PREFIX};
use tubely_core::{AppError, Config, ThumbnailStoreMode, Video};
use tubely_db::{AssetField, VideoRepository};
use tubely_storage::{object_key, ObjectReference, Storage, Thumbnail, ThumbnailStore};
use uuid::Uuid;

use crate::error::ProcessingError;
use crate::upload::stage::UploadStage;
use crate::upload::staging::{AssetKind, MediaType, StagedFile, StagingArea, UploadStager};
use crate::video::{FastStartRemuxer, MediaInspector};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub staging_dir: PathBuf,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
    pub thumbnail_store: ThumbnailStoreMode,
    pub public_base_url: String,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            max_video_size_bytes: config.max_video_size_bytes,
            max_thumbnail_size_bytes: config.max_thumbnail_size_bytes,
            thumbnail_store: config.thumbnail_store,
            public_base_url: config.public_base_url.clone(),
        }
    }
}

#[derive(Clone)]
pub struct UploadPipeline {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    thumbnails: Arc<dyn ThumbnailStore>,
    inspector: MediaInspector,
    remuxer: FastStartRemuxer,
    settings: PipelineSettings,
}

impl UploadPipeline {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        thumbnails: Arc<dyn ThumbnailStore>,
        inspector: MediaInspector,
        remuxer: FastStartRemuxer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            repository,
            storage,
            thumbnails,
            inspector,
            remuxer,
            settings,
        }
    }

    /// Stable retrieval URL for a thumbnail kept in process.
    pub fn thumbnail_route_url(&self, video_id: Uuid) -> String {
        format!(
            "{}{}/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            THUMBNAIL_ROUTE_PREFIX,
            video_id
        )
    }

    /// Upload a video for `video_id` on behalf of `user_id`.
    ///
    /// The staged upload is remuxed for fast start, classified by geometry and
    /// stored under `{landscape|portrait|other}/<id>.mp4`. Returns the updated
    /// record.
    #[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload_video<S, E>(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        content_type: Option<&str>,
        body: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display + Send,
    {
        let video = self.authorize(video_id, user_id).await?;

        let stager = UploadStager::new(AssetKind::Video, self.settings.max_video_size_bytes);
        let media_type = UploadStage::Validated.finish(stager.validate(content_type))?;

        let mut area = StagingArea::new(&self.settings.staging_dir);
        let result = self
            .process_video(&mut area, stager, video, media_type, body)
            .await;
        area.cleanup();
        result
    }

    /// Upload a thumbnail for `video_id` on behalf of `user_id`.
    ///
    /// Depending on the configured mode the thumbnail goes to the object store
    /// under `thumbnails/<id>.<ext>` or to the in-process thumbnail store.
    #[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload_thumbnail<S, E>(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        content_type: Option<&str>,
        body: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display + Send,
    {
        let video = self.authorize(video_id, user_id).await?;

        let stager = UploadStager::new(
            AssetKind::Thumbnail,
            self.settings.max_thumbnail_size_bytes,
        );
        let media_type = UploadStage::Validated.finish(stager.validate(content_type))?;

        let mut area = StagingArea::new(&self.settings.staging_dir);
        let result = self
            .process_thumbnail(&mut area, stager, video, media_type, body)
            .await;
        area.cleanup();
        result
    }

    /// Load the record and check ownership before anything touches disk.
    async fn authorize(&self, video_id: Uuid, user_id: Uuid) -> Result<Video, AppError> {
        let video = self
            .repository
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if !video.is_owned_by(user_id) {
            tracing::warn!(
                video_id = %video_id,
                user_id = %user_id,
                "Upload rejected: caller does not own the video"
            );
            return Err(AppError::Forbidden(format!(
                "User {} does not own video {}",
                user_id, video_id
            )));
        }

        tracing::debug!(stage = %UploadStage::Received, "Upload authorized");
        Ok(video)
    }

    async fn process_video<S, E>(
        &self,
        area: &mut StagingArea,
        stager: UploadStager,
        video: Video,
        media_type: MediaType,
        body: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display + Send,
    {
        let StagedFile {
            path: input,
            file,
            media_type,
            ..
        } = UploadStage::Staged.finish(stager.stage(area, media_type, body).await)?;
        drop(file);

        let processed = UploadStage::Remuxed.finish(self.remuxer.remux(&input, area).await)?;
        area.release(&input);

        let geometry = UploadStage::Inspected.finish(self.inspector.inspect(&processed).await)?;

        let key = object_key(geometry.key_prefix(), media_type.extension());
        let reference = UploadStage::Uploaded.finish(
            self.upload_file(&processed, &key, media_type.essence())
                .await,
        )?;

        let video = self
            .update_record(video.id, AssetField::VideoUrl, &reference)
            .await?;

        tracing::info!(
            stage = %UploadStage::Done,
            video_id = %video.id,
            bucket = %reference.bucket(),
            key = %reference.key(),
            geometry = %geometry,
            "Video upload completed"
        );
        Ok(video)
    }

    async fn process_thumbnail<S, E>(
        &self,
        area: &mut StagingArea,
        stager: UploadStager,
        video: Video,
        media_type: MediaType,
        body: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display + Send,
    {
        let StagedFile {
            mut file,
            media_type,
            size,
            ..
        } = UploadStage::Staged.finish(stager.stage(area, media_type, body).await)?;

        let video = match self.settings.thumbnail_store {
            ThumbnailStoreMode::Object => {
                let key = object_key(THUMBNAIL_KEY_PREFIX, media_type.extension());
                let uploaded = self
                    .storage
                    .upload_stream(&key, media_type.essence(), Some(size), Box::pin(file))
                    .await
                    .map_err(ProcessingError::from);
                let reference = UploadStage::Uploaded.finish(uploaded)?;

                let video = self
                    .update_record(video.id, AssetField::ThumbnailUrl, &reference)
                    .await?;
                tracing::info!(
                    stage = %UploadStage::Done,
                    video_id = %video.id,
                    key = %reference.key(),
                    "Thumbnail upload completed"
                );
                video
            }
            ThumbnailStoreMode::Memory => {
                let mut data = Vec::with_capacity(size as usize);
                let read = file
                    .read_to_end(&mut data)
                    .await
                    .map_err(ProcessingError::from);
                UploadStage::Uploaded.finish(read)?;

                // Bytes go in only once the record points at them.
                let route_url = self.thumbnail_route_url(video.id);
                let updated = self
                    .repository
                    .set_asset_url(video.id, AssetField::ThumbnailUrl, &route_url)
                    .await
                    .map_err(ProcessingError::from);
                let video = UploadStage::RecordUpdated.finish(updated)?;

                self.thumbnails
                    .put(
                        video.id,
                        Thumbnail {
                            media_type: media_type.essence().to_string(),
                            data: Bytes::from(data),
                        },
                    )
                    .await;
                tracing::info!(
                    stage = %UploadStage::Done,
                    video_id = %video.id,
                    "Thumbnail stored in memory"
                );
                video
            }
        };

        Ok(video)
    }

    async fn upload_file(
        &self,
        path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<ObjectReference, ProcessingError> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let reference = self
            .storage
            .upload_stream(key, content_type, Some(size), Box::pin(file))
            .await?;
        Ok(reference)
    }

    /// Patch one asset reference on the stored record and return the record
    /// as the store now has it. A failure here leaves `reference` orphaned.
    async fn update_record(
        &self,
        video_id: Uuid,
        field: AssetField,
        reference: &ObjectReference,
    ) -> Result<Video, AppError> {
        let updated = self
            .repository
            .set_asset_url(video_id, field, &reference.encode())
            .await
            .map_err(ProcessingError::from);

        if updated.is_err() {
            tracing::error!(
                video_id = %video_id,
                bucket = %reference.bucket(),
                key = %reference.key(),
                "Stored object has no record pointing to it"
            );
        }
        UploadStage::RecordUpdated.finish(updated)
    }
}
