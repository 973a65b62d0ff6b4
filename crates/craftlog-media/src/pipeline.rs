//! Ingest and removal of media assets.
//!
//! One ingest call writes the original plus one file per requested size
//! (and an optional thumb), all derived concurrently. The call commits an
//! [`Image`] record only when every file landed; on any failure everything
//! written by the call is deleted again, so no orphaned files survive a
//! partial ingest.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use craftlog_core::constants::{RENDITION_WIDTHS, THUMB_QUALITY, THUMB_SIZE};
use craftlog_core::models::{Image, ImageVariant};
use craftlog_core::{AppError, AppResult};
use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::processing;
use crate::storage::LocalMediaStore;

/// One requested rendition. Height defaults to the source aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct SizeSpec {
    pub width: u32,
    pub height: Option<u32>,
}

impl SizeSpec {
    pub fn width(width: u32) -> Self {
        SizeSpec {
            width,
            height: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Target basename (without extension). Defaults to the upload's stem.
    pub name: Option<String>,
    /// When set, only an upload whose field matches is processed; any other
    /// field is ignored without error.
    pub fieldname: Option<String>,
    pub sizes: Vec<SizeSpec>,
    /// Additionally derive a small compressed, metadata-stripped variant.
    pub thumb: bool,
    /// JPEG quality for the size variants (1-100). The thumb always uses
    /// its own fixed quality.
    pub compress: Option<u8>,
}

impl IngestOptions {
    /// The standard rendition set used for avatars and project images: one
    /// aspect-preserving variant per width in [`RENDITION_WIDTHS`] plus the
    /// compressed thumb.
    pub fn standard(name: impl Into<String>) -> Self {
        IngestOptions {
            name: Some(name.into()),
            sizes: RENDITION_WIDTHS.iter().map(|w| SizeSpec::width(*w)).collect(),
            thumb: true,
            ..Default::default()
        }
    }
}

/// One file from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub fieldname: String,
    pub filename: String,
    pub data: Bytes,
}

fn sanitize_stem(filename: &str) -> String {
    const MAX: usize = 64;
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let s: String = stem
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    s
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Media asset pipeline over a [`LocalMediaStore`].
///
/// The pipeline does not serialize calls against the same logical slot
/// (e.g. one user's avatar): two concurrent ingests or an ingest racing a
/// remove can leave both file sets on disk. Callers own the
/// at-most-one-image-per-slot invariant.
#[derive(Clone)]
pub struct MediaPipeline {
    store: Arc<LocalMediaStore>,
}

impl MediaPipeline {
    pub fn new(store: Arc<LocalMediaStore>) -> Self {
        MediaPipeline { store }
    }

    pub fn store(&self) -> &Arc<LocalMediaStore> {
        &self.store
    }

    fn validate(file: &UploadedFile, options: &IngestOptions) -> AppResult<()> {
        if file.filename.trim().is_empty() {
            return Err(AppError::Validation("upload has no filename".to_string()));
        }
        if options.sizes.iter().any(|s| s.width == 0 || s.height == Some(0)) {
            return Err(AppError::Validation(
                "variant sizes must be positive".to_string(),
            ));
        }
        if let Some(q) = options.compress {
            if q == 0 || q > 100 {
                return Err(AppError::Validation(format!(
                    "compress quality out of range: {}",
                    q
                )));
            }
        }
        Ok(())
    }

    /// Ingest one uploaded binary and derive all requested renditions.
    ///
    /// Returns `Ok(None)` when `options.fieldname` is set and does not match
    /// the upload's field. On success the record has exactly
    /// `sizes.len() + thumb as usize` variants and every referenced file
    /// exists; on failure zero files from this call remain on disk and the
    /// first failure is returned.
    pub async fn ingest(
        &self,
        file: UploadedFile,
        target_dir: &str,
        options: &IngestOptions,
    ) -> AppResult<Option<Image>> {
        if let Some(expected) = &options.fieldname {
            if expected != &file.fieldname {
                tracing::debug!(
                    fieldname = %file.fieldname,
                    expected = %expected,
                    "skipping upload for non-matching field"
                );
                return Ok(None);
            }
        }
        Self::validate(&file, options)?;

        let extension = extension_of(&file.filename);
        let base = options
            .name
            .clone()
            .unwrap_or_else(|| sanitize_stem(&file.filename));
        if base.is_empty() {
            return Err(AppError::Validation(format!(
                "cannot derive a basename from {:?}",
                file.filename
            )));
        }

        let dir = target_dir.trim_matches('/').to_string();
        let original_key = format!("{}/{}{}", dir, base, extension);
        // A failed write can still leave a partial file behind; roll it back
        // so a failed ingest never leaves anything on disk.
        if let Err(err) = self.store.write(&original_key, &file.data).await {
            self.cleanup(&original_key, Vec::new()).await;
            return Err(err);
        }

        let (width, height) = match self.probe(file.data.clone()).await {
            Ok(dims) => dims,
            Err(err) => {
                self.cleanup(&original_key, Vec::new()).await;
                return Err(err);
            }
        };

        let mut jobs: Vec<JoinHandle<AppResult<ImageVariant>>> =
            Vec::with_capacity(options.sizes.len() + usize::from(options.thumb));
        for size in &options.sizes {
            let target_height = size
                .height
                .unwrap_or_else(|| processing::derive_height(width, height, size.width));
            jobs.push(self.spawn_variant(
                file.data.clone(),
                dir.clone(),
                base.clone(),
                extension.clone(),
                size.width,
                target_height,
                options.compress,
            ));
        }
        if options.thumb {
            jobs.push(self.spawn_thumb(
                file.data.clone(),
                dir.clone(),
                base.clone(),
                extension.clone(),
            ));
        }

        // Settle everything before deciding: collect successes and failures,
        // never fail fast.
        let results = join_all(jobs).await;
        let mut variants = Vec::new();
        let mut first_error: Option<AppError> = None;
        for result in results {
            match result {
                Ok(Ok(variant)) => variants.push(variant),
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, key = %original_key, "derivative task failed");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(AppError::ImageProcessing(join_err.to_string()));
                    }
                }
            }
        }

        if let Some(err) = first_error {
            // All-or-nothing: roll back the original and every variant that
            // did succeed.
            let keys: Vec<String> = variants.into_iter().map(|v| v.path).collect();
            self.cleanup(&original_key, keys).await;
            return Err(err);
        }

        tracing::info!(
            key = %original_key,
            width,
            height,
            variants = variants.len(),
            "media ingested"
        );
        Ok(Some(Image {
            path: original_key,
            width,
            height,
            variants,
        }))
    }

    /// Delete the original file and every variant file.
    ///
    /// Missing files are treated as already removed, so calling this twice
    /// on the same record succeeds; any other filesystem error propagates
    /// after all deletes have been attempted.
    pub async fn remove(&self, image: &Image) -> AppResult<()> {
        let mut deletes = Vec::with_capacity(image.variants.len() + 1);
        deletes.push(self.store.delete(&image.path));
        for variant in &image.variants {
            deletes.push(self.store.delete(&variant.path));
        }
        let results = join_all(deletes).await;
        for result in results {
            result?;
        }
        tracing::info!(key = %image.path, variants = image.variants.len(), "media removed");
        Ok(())
    }

    async fn probe(&self, data: Bytes) -> AppResult<(u32, u32)> {
        tokio::task::spawn_blocking(move || processing::probe_dimensions(&data))
            .await
            .map_err(|e| AppError::ImageProcessing(e.to_string()))?
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_variant(
        &self,
        data: Bytes,
        dir: String,
        base: String,
        extension: String,
        width: u32,
        height: u32,
        quality: Option<u8>,
    ) -> JoinHandle<AppResult<ImageVariant>> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let rendered =
                tokio::task::spawn_blocking(move || {
                    processing::render_cover(&data, width, height, quality)
                })
                .await
                .map_err(|e| AppError::ImageProcessing(e.to_string()))??;

            let key = format!("{}/{}_{}x{}{}", dir, base, width, height, extension);
            store.write(&key, &rendered).await?;
            Ok(ImageVariant { path: key, width })
        })
    }

    fn spawn_thumb(
        &self,
        data: Bytes,
        dir: String,
        base: String,
        extension: String,
    ) -> JoinHandle<AppResult<ImageVariant>> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let rendered = tokio::task::spawn_blocking(move || {
                processing::render_thumb(&data, THUMB_SIZE, THUMB_QUALITY)
            })
            .await
            .map_err(|e| AppError::ImageProcessing(e.to_string()))??;

            let key = format!(
                "{}/{}_{}x{}{}",
                dir, base, THUMB_SIZE, THUMB_SIZE, extension
            );
            store.write(&key, &rendered).await?;
            Ok(ImageVariant {
                path: key,
                width: THUMB_SIZE,
            })
        })
    }

    /// Best-effort rollback of a failed ingest.
    async fn cleanup(&self, original_key: &str, variant_keys: Vec<String>) {
        let mut deletes = Vec::with_capacity(variant_keys.len() + 1);
        deletes.push(self.store.delete(original_key));
        for key in &variant_keys {
            deletes.push(self.store.delete(key));
        }
        for result in join_all(deletes).await {
            if let Err(err) = result {
                tracing::error!(error = %err, key = %original_key, "ingest rollback failed");
            }
        }
    }
}
