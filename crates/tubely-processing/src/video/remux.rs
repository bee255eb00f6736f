//! Fast-start remux through ffmpeg.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tubely_core::constants::REMUX_OUTPUT_SUFFIX;

use crate::command::CommandRunner;
use crate::error::ProcessingError;
use crate::upload::staging::StagingArea;

const TOOL: &str = "ffmpeg";

/// Moves the MP4 index (`moov` atom) to the front of the file with a stream copy.
#[derive(Clone)]
pub struct FastStartRemuxer {
    runner: Arc<dyn CommandRunner>,
    ffmpeg_path: String,
}

/// Path the remuxed copy of `input` is written to.
pub fn remux_output_path(input: &Path) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(REMUX_OUTPUT_SUFFIX);
    PathBuf::from(path)
}

impl FastStartRemuxer {
    pub fn new(runner: Arc<dyn CommandRunner>, ffmpeg_path: impl Into<String>) -> Self {
        Self {
            runner,
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Remux `input` to a new staged file and return its path.
    ///
    /// The output path is registered with `area` before ffmpeg starts, so a
    /// partially written output is removed with the rest of the staging area.
    #[tracing::instrument(skip(self, area), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remux_faststart"
    ))]
    pub async fn remux(
        &self,
        input: &Path,
        area: &mut StagingArea,
    ) -> Result<PathBuf, ProcessingError> {
        let start = std::time::Instant::now();
        let output_path = remux_output_path(input);
        area.register(output_path.clone())?;

        let args: Vec<OsString> = vec![
            "-nostdin".into(),
            "-v".into(),
            "error".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-c".into(),
            "copy".into(),
            "-movflags".into(),
            "faststart".into(),
            "-f".into(),
            "mp4".into(),
            output_path.as_os_str().to_owned(),
        ];

        let output = self.runner.run(&self.ffmpeg_path, &args).await?;
        if !output.success() {
            return Err(ProcessingError::ToolFailed {
                tool: TOOL,
                status: output.status_display(),
                stderr: output.stderr_lossy(),
            });
        }

        tracing::info!(
            output = %output_path.display(),
            duration_ms = start.elapsed().as_millis(),
            "Fast-start remux completed"
        );
        Ok(output_path)
    }
}
