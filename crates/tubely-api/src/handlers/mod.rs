pub mod health;
pub mod thumbnail_get;
pub mod thumbnail_upload;
pub mod video_get;
pub mod video_upload;

use tubely_core::AppError;
use uuid::Uuid;

/// Parse a `{video_id}` path segment; malformed ids are a 400, not a 404.
fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Ok(Uuid::parse_str(raw)?)
}
