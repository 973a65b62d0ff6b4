use serde::{Deserialize, Serialize};

/// A derived, resized rendition of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    /// Path relative to the public static root.
    pub path: String,
    pub width: u32,
}

/// A committed media record: the original file plus its renditions.
///
/// Invariant: every recorded path corresponds to an existing file for as
/// long as the record exists. Record and files are removed together by the
/// media pipeline; an `Image` is never mutated in place — replacing media is
/// remove-then-ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Path of the original file, relative to the public static root.
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub variants: Vec<ImageVariant>,
}
