//! PostgreSQL-backed video records.
//!
//! Expects a `videos` table with columns `id uuid primary key, user_id uuid,
//! title text, description text, thumbnail_url text null, video_url text null,
//! created_at timestamptz, updated_at timestamptz`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tubely_core::Video;
use uuid::Uuid;

use crate::{AssetField, DbError, DbResult, VideoRepository};

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    thumbnail_url: Option<String>,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            video_url: row.video_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn get_video(&self, id: Uuid) -> DbResult<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Video::from))
    }

    async fn set_asset_url(&self, id: Uuid, field: AssetField, url: &str) -> DbResult<Video> {
        // Column names cannot be bound; each field gets its own statement.
        let query = match field {
            AssetField::VideoUrl => {
                r#"
                UPDATE videos
                SET video_url = $2, updated_at = $3
                WHERE id = $1
                RETURNING id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
                "#
            }
            AssetField::ThumbnailUrl => {
                r#"
                UPDATE videos
                SET thumbnail_url = $2, updated_at = $3
                WHERE id = $1
                RETURNING id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
                "#
            }
        };

        let row = sqlx::query_as::<_, VideoRow>(query)
            .bind(id)
            .bind(url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound(id))?;

        tracing::debug!(video_id = %id, column = field.column(), "Video record updated");
        Ok(Video::from(row))
    }

    async fn list_videos(&self, user_id: Uuid) -> DbResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            FROM videos
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Video::from).collect())
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
