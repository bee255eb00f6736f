//! Service wiring: metadata store, object store, external tools, pipeline.

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::{Config, ThumbnailStoreMode};
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use tubely_processing::{
    AccessUrlIssuer, CommandRunner, FastStartRemuxer, MediaInspector, PipelineSettings,
    TokioCommandRunner, UploadPipeline,
};
use tubely_storage::{create_storage, MemoryThumbnailStore, Storage, ThumbnailStore};

use crate::auth::{IdentityVerifier, JwtVerifier};
use crate::state::AppState;

/// Connect to external services and build the application state.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let repository: Arc<dyn VideoRepository> = match config.database_url {
        Some(ref url) => {
            let repository = PgVideoRepository::connect(url)
                .await
                .context("Failed to connect to the metadata database")?;
            tracing::info!("Using PostgreSQL metadata store");
            Arc::new(repository)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory");
            Arc::new(InMemoryVideoRepository::new())
        }
    };

    let storage = create_storage(config).context("Failed to configure object storage")?;

    if config.thumbnail_store == ThumbnailStoreMode::Memory {
        tracing::warn!(
            public_base_url = %config.public_base_url,
            "Thumbnails are kept in process memory and served without expiry"
        );
    }

    let runner: Arc<dyn CommandRunner> =
        Arc::new(TokioCommandRunner::new(config.external_tool_timeout));
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtVerifier::new(&config.jwt_secret));

    Ok(build_state(
        config,
        repository,
        storage,
        Arc::new(MemoryThumbnailStore::new()),
        runner,
        verifier,
    ))
}

/// Assemble the state from already constructed collaborators.
pub fn build_state(
    config: &Config,
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    thumbnails: Arc<dyn ThumbnailStore>,
    runner: Arc<dyn CommandRunner>,
    verifier: Arc<dyn IdentityVerifier>,
) -> Arc<AppState> {
    let pipeline = UploadPipeline::new(
        repository.clone(),
        storage.clone(),
        thumbnails.clone(),
        MediaInspector::new(runner.clone(), config.ffprobe_path.clone()),
        FastStartRemuxer::new(runner, config.ffmpeg_path.clone()),
        PipelineSettings::from(config),
    );
    let issuer = AccessUrlIssuer::new(storage, config.presigned_url_ttl);

    Arc::new(AppState {
        config: config.clone(),
        repository,
        pipeline,
        issuer,
        thumbnails,
        verifier,
    })
}
