use crate::{S3Storage, Storage, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

/// Create the object store backend from configuration
pub fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = S3Storage::new(
        config.s3_bucket.clone(),
        config.s3_region.clone(),
        config.s3_endpoint.clone(),
    )?;
    tracing::info!(
        bucket = %config.s3_bucket,
        region = %config.s3_region,
        endpoint = ?config.s3_endpoint,
        "Object storage configured"
    );
    Ok(Arc::new(storage))
}
