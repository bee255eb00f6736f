//! Shared application state.

use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{AccessUrlIssuer, UploadPipeline};
use tubely_storage::ThumbnailStore;

use crate::auth::IdentityVerifier;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn VideoRepository>,
    pub pipeline: UploadPipeline,
    pub issuer: AccessUrlIssuer,
    pub thumbnails: Arc<dyn ThumbnailStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}
