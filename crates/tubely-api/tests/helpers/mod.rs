//! Test helpers: build AppState and router for integration tests.
//!
//! The object store, ffmpeg/ffprobe and the metadata store are replaced with
//! in-process fakes, so these tests need neither Docker nor the media tools.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtVerifier;
use tubely_api::setup::{routes, services};
use tubely_core::{Config, Video};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::test_helpers::{MockStorage, ScriptedCommandRunner};
use tubely_storage::MemoryThumbnailStore;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_BUCKET: &str = "tubely-test";

/// Test application: server plus handles on every fake behind it.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MockStorage>,
    pub runner: Arc<ScriptedCommandRunner>,
    pub repository: InMemoryVideoRepository,
    pub thumbnails: Arc<MemoryThumbnailStore>,
    pub verifier: JwtVerifier,
    pub staging: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// A fresh user and a bearer token for them.
    pub fn user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = self
            .verifier
            .issue_token(user_id, chrono::Duration::hours(1))
            .expect("Failed to issue token");
        (user_id, token)
    }

    /// Seed a video record owned by `user_id`.
    pub async fn create_video(&self, user_id: Uuid) -> Video {
        let video = Video::new(user_id, "Boot camp", "Lacing techniques");
        self.repository.insert(video.clone()).await;
        video
    }

    /// The stored record for `video_id`.
    pub async fn repository_video(&self, video_id: Uuid) -> Video {
        self.repository
            .get_video(video_id)
            .await
            .expect("Repository failure")
            .expect("Video record missing")
    }
}

/// Setup test app with object-mode thumbnails and 16:9 probe output.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[], ScriptedCommandRunner::media_tools("16:9")).await
}

/// Setup test app with extra environment overrides and a custom tool script.
pub async fn setup_test_app_with(
    overrides: &[(&str, &str)],
    runner: ScriptedCommandRunner,
) -> TestApp {
    let staging = TempDir::new().expect("Failed to create staging dir");

    let mut env: HashMap<String, String> = [
        ("JWT_SECRET", TEST_JWT_SECRET),
        ("S3_BUCKET", TEST_BUCKET),
        ("S3_REGION", "us-east-1"),
        ("MAX_VIDEO_SIZE_MB", "1"),
        ("MAX_THUMBNAIL_SIZE_MB", "1"),
        ("PUBLIC_BASE_URL", "http://tubely.test"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    env.insert(
        "STAGING_DIR".to_string(),
        staging.path().display().to_string(),
    );
    for (k, v) in overrides {
        env.insert(k.to_string(), v.to_string());
    }
    let config = Config::from_lookup(|key| env.get(key).cloned()).expect("Invalid test config");

    let storage = Arc::new(MockStorage::new(TEST_BUCKET));
    let runner = Arc::new(runner);
    let repository = InMemoryVideoRepository::new();
    let thumbnails = Arc::new(MemoryThumbnailStore::new());
    let verifier = JwtVerifier::new(TEST_JWT_SECRET);

    let state = services::build_state(
        &config,
        Arc::new(repository.clone()),
        storage.clone(),
        thumbnails.clone(),
        runner.clone(),
        Arc::new(verifier.clone()),
    );

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        runner,
        repository,
        thumbnails,
        verifier,
        staging,
    }
}
