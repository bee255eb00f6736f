//! Constants shared across crates.

/// Issuer expected in access tokens.
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Multipart field carrying the video bytes.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Multipart field carrying the thumbnail bytes.
pub const THUMBNAIL_FORM_FIELD: &str = "thumbnail";

/// Media types accepted for video uploads.
pub const VIDEO_MEDIA_TYPES: &[&str] = &["video/mp4"];

/// Media types accepted for thumbnail uploads.
pub const THUMBNAIL_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Key prefix for thumbnails written to the object store.
pub const THUMBNAIL_KEY_PREFIX: &str = "thumbnails/";

/// Prefix of every staged file name.
pub const STAGED_FILE_PREFIX: &str = "tubely-upload-";

/// Suffix appended to a staged file path by the fast-start remux.
pub const REMUX_OUTPUT_SUFFIX: &str = ".processed";

/// Path of the fallback thumbnail retrieval endpoint (followed by the video id).
pub const THUMBNAIL_ROUTE_PREFIX: &str = "/api/thumbnails";
