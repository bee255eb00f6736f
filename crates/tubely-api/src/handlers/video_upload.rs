use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::{AppError, VideoResponse};

use super::parse_video_id;
use crate::auth::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::state::AppState;

/// `POST /api/video_upload/{video_id}`: multipart field `video`, `video/mp4` only.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let video = state
            .pipeline
            .upload_video(video_id, user.user_id, content_type.as_deref(), field)
            .await?;

        return Ok(Json(state.issuer.issue(video).await));
    }

    Err(AppError::InvalidInput(format!(
        "Missing multipart field '{}'",
        VIDEO_FORM_FIELD
    ))
    .into())
}
