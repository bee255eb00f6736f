//! Video-only stages: fast-start remux, geometry inspection and placement.

pub mod placement;
pub mod probe;
pub mod remux;

pub use placement::Geometry;
pub use probe::MediaInspector;
pub use remux::FastStartRemuxer;
