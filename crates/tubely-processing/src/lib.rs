//! Tubely media processing
//!
//! The ingestion pipeline: staging inbound uploads, the external ffprobe and
//! ffmpeg invocations, placement classification, upload orchestration and
//! access URL issuance.

pub mod access;
pub mod command;
pub mod error;
pub mod upload;
pub mod video;

pub use access::AccessUrlIssuer;
pub use command::{CommandError, CommandOutput, CommandRunner, TokioCommandRunner};
pub use error::ProcessingError;
pub use upload::{
    AssetKind, MediaType, PipelineSettings, StagedFile, StagingArea, UploadPipeline, UploadStage,
    UploadStager,
};
pub use video::{FastStartRemuxer, Geometry, MediaInspector};

// Test helpers (test builds, or downstream crates enabling `test-helpers`)
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
