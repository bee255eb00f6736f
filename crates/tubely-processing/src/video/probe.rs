//! Media inspection through ffprobe.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use crate::command::CommandRunner;
use crate::error::ProcessingError;
use crate::video::placement::Geometry;

const TOOL: &str = "ffprobe";

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    display_aspect_ratio: Option<String>,
}

/// Classifies staged videos by running ffprobe against them.
#[derive(Clone)]
pub struct MediaInspector {
    runner: Arc<dyn CommandRunner>,
    ffprobe_path: String,
}

impl MediaInspector {
    pub fn new(runner: Arc<dyn CommandRunner>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            runner,
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Probe `path` and classify the first video stream's display aspect ratio.
    ///
    /// A file without a video stream, or whose first video stream has no
    /// aspect ratio, classifies as [`Geometry::Other`]. A failing ffprobe run or
    /// unparseable output is an error.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn inspect(&self, path: &Path) -> Result<Geometry, ProcessingError> {
        let args: Vec<OsString> = vec![
            "-v".into(),
            "error".into(),
            "-print_format".into(),
            "json".into(),
            "-show_streams".into(),
            path.as_os_str().to_owned(),
        ];

        let output = self.runner.run(&self.ffprobe_path, &args).await?;
        if !output.success() {
            return Err(ProcessingError::ToolFailed {
                tool: TOOL,
                status: output.status_display(),
                stderr: output.stderr_lossy(),
            });
        }

        let probe: ProbeOutput =
            serde_json::from_slice(&output.stdout).map_err(|e| ProcessingError::MalformedOutput {
                tool: TOOL,
                message: e.to_string(),
            })?;

        let aspect_ratio = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .and_then(|s| s.display_aspect_ratio.as_deref())
            .unwrap_or_default();

        let geometry = Geometry::from_aspect_ratio(aspect_ratio);
        tracing::info!(
            aspect_ratio = %aspect_ratio,
            geometry = %geometry,
            "Video probe completed"
        );
        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::test_helpers::{probe_json, Script, ScriptedCommandRunner};

    fn inspector(runner: ScriptedCommandRunner) -> (MediaInspector, Arc<ScriptedCommandRunner>) {
        let runner = Arc::new(runner);
        (MediaInspector::new(runner.clone(), "ffprobe"), runner)
    }

    #[tokio::test]
    async fn test_classifies_first_video_stream() {
        let stdout = r#"{"streams":[
            {"codec_type":"audio"},
            {"codec_type":"video","width":720,"height":1280,"display_aspect_ratio":"9:16"},
            {"codec_type":"video","display_aspect_ratio":"16:9"}
        ]}"#;
        let (inspector, runner) =
            inspector(ScriptedCommandRunner::new().on("ffprobe", Script::stdout(stdout)));

        let geometry = inspector.inspect(Path::new("/tmp/in.mp4")).await.unwrap();
        assert_eq!(geometry, Geometry::Portrait);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].1,
            vec!["-v", "error", "-print_format", "json", "-show_streams", "/tmp/in.mp4"]
        );
    }

    #[tokio::test]
    async fn test_missing_video_stream_is_other() {
        for stdout in [
            r#"{"streams":[{"codec_type":"audio"}]}"#,
            r#"{"streams":[]}"#,
            r#"{}"#,
            r#"{"streams":[{"codec_type":"video"}]}"#,
        ] {
            let (inspector, _) =
                inspector(ScriptedCommandRunner::new().on("ffprobe", Script::stdout(stdout)));
            let geometry = inspector.inspect(Path::new("in.mp4")).await.unwrap();
            assert_eq!(geometry, Geometry::Other, "{}", stdout);
        }
    }

    #[tokio::test]
    async fn test_landscape() {
        let (inspector, _) = inspector(
            ScriptedCommandRunner::new().on("ffprobe", Script::stdout(&probe_json("16:9"))),
        );
        assert_eq!(
            inspector.inspect(Path::new("in.mp4")).await.unwrap(),
            Geometry::Landscape
        );
    }

    #[tokio::test]
    async fn test_malformed_output_is_error() {
        let (inspector, _) =
            inspector(ScriptedCommandRunner::new().on("ffprobe", Script::stdout("not json {")));
        let result = inspector.inspect(Path::new("in.mp4")).await;
        assert!(matches!(result, Err(ProcessingError::MalformedOutput { .. })));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let failed = CommandOutput {
            status: Some(1),
            stdout: b"{\"streams\":[]}".to_vec(),
            stderr: b"in.mp4: Invalid data found when processing input".to_vec(),
        };
        let (inspector, _) =
            inspector(ScriptedCommandRunner::new().on("ffprobe", Script::Output(failed)));
        let result = inspector.inspect(Path::new("in.mp4")).await;
        match result {
            Err(ProcessingError::ToolFailed { tool, stderr, .. }) => {
                assert_eq!(tool, "ffprobe");
                assert!(stderr.contains("Invalid data"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_error() {
        let (inspector, _) = inspector(ScriptedCommandRunner::new().on("ffprobe", Script::TimeOut));
        let result = inspector.inspect(Path::new("in.mp4")).await;
        assert!(matches!(result, Err(ProcessingError::Command(_))));
    }
}
