//! Configuration module
//!
//! Service configuration is read from the environment (after loading `.env`)
//! with defaults for everything except secrets and the destination bucket.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const PORT: u16 = 8091;
const MAX_VIDEO_SIZE_MB: u64 = 1024;
const MAX_THUMBNAIL_SIZE_MB: u64 = 10;
const EXTERNAL_TOOL_TIMEOUT_SECS: u64 = 300;
const PRESIGNED_URL_TTL_SECS: u64 = 3600;
const MIN_JWT_SECRET_LEN: usize = 32;
const HTTP_CONCURRENCY_LIMIT: u64 = 1024;

/// Where thumbnail bytes end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStoreMode {
    /// Durable object store, served through presigned URLs
    Object,
    /// In-process map, served through the thumbnail retrieval endpoint
    Memory,
}

impl FromStr for ThumbnailStoreMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "object" | "s3" => Ok(ThumbnailStoreMode::Object),
            "memory" => Ok(ThumbnailStoreMode::Memory),
            other => Err(anyhow::anyhow!(
                "THUMBNAIL_STORE must be 'object' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub jwt_secret: String,
    /// PostgreSQL metadata store; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub s3_bucket: String,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    pub staging_dir: PathBuf,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub external_tool_timeout: Duration,
    pub presigned_url_ttl: Duration,
    pub thumbnail_store: ThumbnailStoreMode,
    pub public_base_url: String,
    pub cors_origins: Vec<String>,
    /// Server-wide cap on in-flight requests
    pub http_concurrency_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => PORT,
        };

        let number = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            match lookup(key) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
                None => Ok(default),
            }
        };
        let mb = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            number(key, default)?
                .checked_mul(1024 * 1024)
                .ok_or_else(|| anyhow::anyhow!("{} is too large", key))
        };
        let secs = |key: &str, default: u64| -> Result<Duration, anyhow::Error> {
            Ok(Duration::from_secs(number(key, default)?))
        };

        let thumbnail_store = match lookup("THUMBNAIL_STORE") {
            Some(mode) => mode.parse()?,
            None => ThumbnailStoreMode::Object,
        };

        let config = Config {
            server_port,
            environment,
            jwt_secret: lookup("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            s3_bucket: lookup("S3_BUCKET")
                .ok_or_else(|| anyhow::anyhow!("S3_BUCKET must be set"))?,
            s3_region: lookup("S3_REGION")
                .or_else(|| lookup("AWS_REGION"))
                .ok_or_else(|| anyhow::anyhow!("S3_REGION or AWS_REGION must be set"))?,
            s3_endpoint: lookup("S3_ENDPOINT"),
            staging_dir: lookup("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_video_size_bytes: mb("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?,
            max_thumbnail_size_bytes: mb("MAX_THUMBNAIL_SIZE_MB", MAX_THUMBNAIL_SIZE_MB)?,
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            external_tool_timeout: secs("EXTERNAL_TOOL_TIMEOUT_SECS", EXTERNAL_TOOL_TIMEOUT_SECS)?,
            presigned_url_ttl: secs("PRESIGNED_URL_TTL_SECS", PRESIGNED_URL_TTL_SECS)?,
            thumbnail_store,
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", server_port)),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            http_concurrency_limit: usize::try_from(number(
                "HTTP_CONCURRENCY_LIMIT",
                HTTP_CONCURRENCY_LIMIT,
            )?)
            .unwrap_or(usize::MAX)
            .max(1),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if let Some(ref url) = self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.s3_bucket.trim().is_empty() || self.s3_bucket.contains(',') {
            return Err(anyhow::anyhow!("S3_BUCKET must be a non-empty name without commas"));
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than zero"));
        }

        if self.external_tool_timeout.is_zero() {
            return Err(anyhow::anyhow!("EXTERNAL_TOOL_TIMEOUT_SECS must be greater than zero"));
        }

        if self.presigned_url_ttl.is_zero() {
            return Err(anyhow::anyhow!("PRESIGNED_URL_TTL_SECS must be greater than zero"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("S3_BUCKET", "tubely-assets"),
            ("AWS_REGION", "us-east-1"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();
        assert_eq!(config.server_port, 8091);
        assert_eq!(config.max_video_size_bytes, 1 << 30);
        assert_eq!(config.max_thumbnail_size_bytes, 10 << 20);
        assert_eq!(config.presigned_url_ttl, Duration::from_secs(3600));
        assert_eq!(config.thumbnail_store, ThumbnailStoreMode::Object);
        assert_eq!(config.s3_region, "us-east-1");
        assert_eq!(config.public_base_url, "http://localhost:8091");
        assert!(config.database_url.is_none());
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = required();
        pairs.extend([
            ("PORT", "9000"),
            ("MAX_VIDEO_SIZE_MB", "5"),
            ("THUMBNAIL_STORE", "memory"),
            ("EXTERNAL_TOOL_TIMEOUT_SECS", "12"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://tubely.example, https://admin.tubely.example"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.max_video_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.thumbnail_store, ThumbnailStoreMode::Memory);
        assert_eq!(config.external_tool_timeout, Duration::from_secs(12));
        assert_eq!(config.public_base_url, "http://localhost:9000");
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.is_production());
    }

    #[test]
    fn test_validation() {
        let mut pairs = required();
        pairs[0] = ("JWT_SECRET", "short");
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = required();
        pairs.push(("DATABASE_URL", "mysql://localhost/tubely"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = required();
        pairs.push(("THUMBNAIL_STORE", "disk"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let pairs = vec![("JWT_SECRET", "0123456789abcdef0123456789abcdef")];
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_size_and_duration_values_are_checked() {
        for (key, value) in [
            ("MAX_VIDEO_SIZE_MB", "18446744073709551615"),
            ("MAX_VIDEO_SIZE_MB", "lots"),
            ("MAX_THUMBNAIL_SIZE_MB", "-1"),
            ("PRESIGNED_URL_TTL_SECS", "1h"),
        ] {
            let mut pairs = required();
            pairs.push((key, value));
            let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(err.to_string().contains(key), "{}", err);
        }
    }
}
