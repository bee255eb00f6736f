//! Upload ingestion: staging, the per-upload state machine and orchestration.

pub mod pipeline;
pub mod stage;
pub mod staging;

pub use pipeline::{PipelineSettings, UploadPipeline};
pub use stage::UploadStage;
pub use staging::{AssetKind, MediaType, StagedFile, StagingArea, UploadStager};
