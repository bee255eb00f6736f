use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

use super::parse_video_id;
use crate::error::HttpAppError;
use crate::state::AppState;

/// `GET /api/thumbnails/{video_id}`: thumbnails kept in process. Public.
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Response, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    let thumbnail = state
        .thumbnails
        .get(video_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Thumbnail for video {} not found", video_id)))?;

    Ok((
        [
            (header::CONTENT_TYPE, thumbnail.media_type),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        thumbnail.data,
    )
        .into_response())
}
