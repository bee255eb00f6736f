//! Upload staging.
//!
//! ffprobe and ffmpeg need random access to their input, so every inbound
//! stream is first copied to a file in the staging directory. All staged
//! files of one request are owned by a [`StagingArea`] which removes them
//! when the request finishes.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::{self, Display};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tubely_core::constants::{
    STAGED_FILE_PREFIX, THUMBNAIL_FORM_FIELD, THUMBNAIL_MEDIA_TYPES, VIDEO_FORM_FIELD,
    VIDEO_MEDIA_TYPES,
};

use crate::error::ProcessingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Thumbnail,
}

impl AssetKind {
    pub fn accepted_media_types(self) -> &'static [&'static str] {
        match self {
            AssetKind::Video => VIDEO_MEDIA_TYPES,
            AssetKind::Thumbnail => THUMBNAIL_MEDIA_TYPES,
        }
    }

    /// Multipart field the asset is uploaded in.
    pub fn form_field(self) -> &'static str {
        match self {
            AssetKind::Video => VIDEO_FORM_FIELD,
            AssetKind::Thumbnail => THUMBNAIL_FORM_FIELD,
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_field())
    }
}

/// A `type/subtype` media type with parameters removed, lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    separator: usize,
}

impl MediaType {
    pub fn parse(content_type: &str) -> Result<Self, ProcessingError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.split_once('/') {
            Some((kind, subtype))
                if !kind.is_empty()
                    && !subtype.is_empty()
                    && !subtype.contains('/')
                    && !essence.contains(char::is_whitespace) =>
            {
                let separator = kind.len();
                Ok(Self { essence, separator })
            }
            _ => Err(ProcessingError::InvalidMediaType(content_type.to_string())),
        }
    }

    /// The bare `type/subtype`.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn subtype(&self) -> &str {
        &self.essence[self.separator + 1..]
    }

    /// File extension used for stored objects of this type.
    pub fn extension(&self) -> &str {
        self.subtype()
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)
    }
}

/// Staged files created while handling one request.
pub struct StagingArea {
    dir: PathBuf,
    paths: Vec<TempPath>,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Take ownership of a path that a later step will create.
    pub fn register(&mut self, path: PathBuf) -> std::io::Result<()> {
        self.paths.push(TempPath::try_from_path(path)?);
        Ok(())
    }

    fn track(&mut self, path: TempPath) {
        self.paths.push(path);
    }

    /// Remove a staged file that no later stage needs.
    pub fn release(&mut self, path: &Path) {
        if let Some(index) = self.paths.iter().position(|p| {
            let staged: &Path = p;
            staged == path
        }) {
            Self::remove(self.paths.remove(index));
        }
    }

    /// Remove every staged file, newest first.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn cleanup(self) {
        for path in self.paths.into_iter().rev() {
            Self::remove(path);
        }
    }

    fn remove(path: TempPath) {
        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => tracing::debug!(path = %shown, "Removed staged file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %shown, "Staged file was never created")
            }
            Err(e) => tracing::warn!(path = %shown, error = %e, "Failed to remove staged file"),
        }
    }
}

/// A fully written staged upload, rewound to the start.
pub struct StagedFile {
    pub path: PathBuf,
    pub file: File,
    pub media_type: MediaType,
    pub size: u64,
}

/// Validates and stages uploads of one asset kind.
#[derive(Debug, Clone, Copy)]
pub struct UploadStager {
    kind: AssetKind,
    max_bytes: u64,
}

impl UploadStager {
    pub fn new(kind: AssetKind, max_bytes: u64) -> Self {
        Self { kind, max_bytes }
    }

    /// Check the declared content type against the accepted set.
    pub fn validate(&self, content_type: Option<&str>) -> Result<MediaType, ProcessingError> {
        let content_type = content_type.ok_or_else(|| {
            ProcessingError::InvalidMediaType(format!("missing content type for {}", self.kind))
        })?;
        let media_type = MediaType::parse(content_type)?;

        if !self
            .kind
            .accepted_media_types()
            .contains(&media_type.essence())
        {
            return Err(ProcessingError::UnsupportedMediaType(format!(
                "{} (accepted for {}: {})",
                media_type,
                self.kind,
                self.kind.accepted_media_types().join(", ")
            )));
        }
        Ok(media_type)
    }

    /// Copy `body` into a new staged file owned by `area`.
    ///
    /// The size cap is enforced while copying; an oversized or failed stream
    /// leaves its partial file in `area` for cleanup.
    pub async fn stage<S, E>(
        &self,
        area: &mut StagingArea,
        media_type: MediaType,
        body: S,
    ) -> Result<StagedFile, ProcessingError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let named = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .tempfile_in(area.dir())?;
        let (file, temp_path) = named.into_parts();
        let path = temp_path.to_path_buf();
        area.track(temp_path);

        let mut file = File::from_std(file);
        let mut size: u64 = 0;
        let mut body = std::pin::pin!(body);

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ProcessingError::Stream(e.to_string()))?;
            size += chunk.len() as u64;
            if size > self.max_bytes {
                return Err(ProcessingError::TooLarge {
                    limit_bytes: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        if size == 0 {
            return Err(ProcessingError::EmptyUpload);
        }

        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;

        tracing::debug!(
            path = %path.display(),
            media_type = %media_type,
            size_bytes = size,
            "Upload staged"
        );

        Ok(StagedFile {
            path,
            file,
            media_type,
            size,
        })
    }
}
