use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, VideoResponse};

use super::parse_video_id;
use crate::auth::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::state::AppState;

/// `GET /api/videos/{video_id}`: the caller's record with fresh access URLs.
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    user: AuthenticatedUser,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    let video = state
        .repository
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Forbidden(format!(
            "User {} does not own video {}",
            user.user_id, video_id
        ))
        .into());
    }

    Ok(Json(state.issuer.issue(video).await))
}

/// `GET /api/videos`: all of the caller's records, newest first.
///
/// A record whose stored reference cannot be signed carries `url_error`
/// instead of failing the list.
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<VideoResponse>>, HttpAppError> {
    let videos = state.repository.list_videos(user.user_id).await?;
    Ok(Json(state.issuer.issue_all(videos).await))
}
