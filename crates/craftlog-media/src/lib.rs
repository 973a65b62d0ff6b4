//! Media asset pipeline.
//!
//! Ingests one uploaded binary, derives resized renditions concurrently, and
//! guarantees that a failed ingest leaves zero files on disk. Removal is
//! idempotent: record and files go together, and a second removal of the
//! same record succeeds.

pub mod pipeline;
pub mod processing;
pub mod storage;

pub use pipeline::{IngestOptions, MediaPipeline, SizeSpec, UploadedFile};
pub use storage::LocalMediaStore;
