//! Thumbnail API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test thumbnails_test`

mod helpers;

use helpers::fixtures::{fake_png, form};
use helpers::{setup_test_app, setup_test_app_with, TEST_BUCKET};
use tubely_core::VideoResponse;
use tubely_processing::test_helpers::{staged_file_count, ScriptedCommandRunner};
use tubely_storage::ThumbnailStore;
use uuid::Uuid;

#[tokio::test]
async fn test_upload_thumbnail_to_object_store() {
    let app = setup_test_app().await;
    let (user_id, token) = app.user();
    let video = app.create_video(user_id).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form("thumbnail", "cover.png", "image/png", fake_png(512)))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: VideoResponse = response.json();
    let url = body.thumbnail_url.expect("Expected a signed thumbnail URL");
    assert!(
        url.starts_with(&format!("https://{}.s3.test/thumbnails/", TEST_BUCKET)),
        "{}",
        url
    );
    assert!(url.contains(".png?"), "{}", url);

    let keys = app.storage.keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(app.storage.object(&keys[0]).unwrap().content_type, "image/png");
    assert!(app.thumbnails.is_empty().await);
    assert_eq!(staged_file_count(app.staging.path()), 0);
}

#[tokio::test]
async fn test_upload_thumbnail_to_memory_store() {
    let app = setup_test_app_with(
        &[("THUMBNAIL_STORE", "memory")],
        ScriptedCommandRunner::media_tools("16:9"),
    )
    .await;
    let (user_id, token) = app.user();
    let video = app.create_video(user_id).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form("thumbnail", "cover.jpg", "image/jpeg", b"jpeg-bytes".to_vec()))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: VideoResponse = response.json();
    assert_eq!(
        body.thumbnail_url,
        Some(format!("http://tubely.test/api/thumbnails/{}", video.id))
    );
    assert!(app.storage.is_empty());

    let stored = app.thumbnails.get(video.id).await.unwrap();
    assert_eq!(stored.media_type, "image/jpeg");

    // Public: no bearer token needed.
    let response = app
        .client()
        .get(&format!("/api/thumbnails/{}", video.id))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(&response.as_bytes()[..], b"jpeg-bytes");
}

#[tokio::test]
async fn test_thumbnail_replaced_on_reupload() {
    let app = setup_test_app_with(
        &[("THUMBNAIL_STORE", "memory")],
        ScriptedCommandRunner::media_tools("16:9"),
    )
    .await;
    let (user_id, token) = app.user();
    let video = app.create_video(user_id).await;

    for (mime, data) in [("image/jpeg", b"first".to_vec()), ("image/png", fake_png(64))] {
        let response = app
            .client()
            .post(&format!("/api/thumbnail_upload/{}", video.id))
            .add_header("Authorization", format!("Bearer {}", token))
            .multipart(form("thumbnail", "cover", mime, data))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = app
        .client()
        .get(&format!("/api/thumbnails/{}", video.id))
        .await;
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(&response.as_bytes()[..], fake_png(64).as_slice());
}

#[tokio::test]
async fn test_gif_thumbnail_rejected() {
    let app = setup_test_app().await;
    let (user_id, token) = app.user();
    let video = app.create_video(user_id).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form("thumbnail", "cover.gif", "image/gif", b"GIF89a".to_vec()))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(app.storage.is_empty());
    assert!(app.repository_video(video.id).await.thumbnail_url.is_none());
}

#[tokio::test]
async fn test_thumbnail_upload_by_non_owner_is_forbidden() {
    let app = setup_test_app().await;
    let (owner_id, _) = app.user();
    let (_, token) = app.user();
    let video = app.create_video(owner_id).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(form("thumbnail", "cover.png", "image/png", fake_png(64)))
        .await;

    assert_eq!(response.status_code(), 403);
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_missing_thumbnail_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&format!("/api/thumbnails/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app.client().get("/api/thumbnails/nope").await;
    assert_eq!(response.status_code(), 400);
}
