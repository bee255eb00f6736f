//! Tubely Storage Library
//!
//! Durable object storage for processed assets, plus the in-process thumbnail
//! store used when no signing-capable object store is configured.
//!
//! # Object keys and references
//!
//! Keys are `{prefix}{id}.{ext}` where `id` is 32 random bytes in unpadded
//! base64url. A stored object is referenced from the metadata store by the
//! opaque string `{bucket},{key}` (see [`ObjectReference`]).

pub mod factory;
pub mod keys;
pub mod reference;
pub mod s3;
pub mod thumbnails;
pub mod traits;

pub use factory::create_storage;
pub use keys::{generate_object_id, object_key};
pub use reference::ObjectReference;
pub use s3::S3Storage;
pub use thumbnails::{MemoryThumbnailStore, Thumbnail, ThumbnailStore};
pub use traits::{Storage, StorageError, StorageResult};
