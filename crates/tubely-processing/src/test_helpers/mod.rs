//! Fakes for the pipeline's collaborators.

mod command_runner;
mod repository;
mod storage;

pub use command_runner::{Script, ScriptedCommandRunner};
pub use repository::FailingUpdateRepository;
pub use storage::{MockStorage, StoredObject};

use bytes::Bytes;
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::path::Path;

/// ffprobe `-show_streams` JSON for a file with one audio and one video stream.
pub fn probe_json(display_aspect_ratio: &str) -> String {
    serde_json::json!({
        "streams": [
            { "index": 0, "codec_type": "audio", "codec_name": "aac" },
            {
                "index": 1,
                "codec_type": "video",
                "codec_name": "h264",
                "display_aspect_ratio": display_aspect_ratio
            }
        ]
    })
    .to_string()
}

/// A request body stream yielding `data` in chunks of `chunk_size` bytes.
pub fn byte_stream(
    data: &[u8],
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let chunks: Vec<Result<Bytes, Infallible>> = data
        .chunks(chunk_size.max(1))
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    stream::iter(chunks)
}

/// Number of directory entries left in a staging directory.
pub fn staged_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}
