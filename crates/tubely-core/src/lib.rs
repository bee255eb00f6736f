//! Tubely Core Library
//!
//! Shared configuration, the service-wide error taxonomy and the video record
//! model used by every other Tubely crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::{Config, ThumbnailStoreMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Video, VideoResponse};
