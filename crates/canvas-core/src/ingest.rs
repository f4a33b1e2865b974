//! Persists captured bytes into the diagrams folder.
//!
//! Files are named `diagram_<YYYYMMDD_HHMMSS>.<ext>` using local time. The
//! extension comes from the source hint when there is one, otherwise from the
//! image magic bytes, otherwise `png`.
//!
//! After the write a [`PostProcessor`] gets a chance to rewrite the file in
//! place. Its failures are logged and never fail the ingestion.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::CanvasError;

const DEFAULT_EXTENSION: &str = "png";

/// Errors that abort an ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not create directory '{}': {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<IngestError> for CanvasError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::CreateDir { dir, source } => {
                CanvasError::create_dir_failed(&dir, &source.to_string())
            }
            IngestError::Write { path, source } => {
                CanvasError::write_failed(&path, &source.to_string())
            }
        }
    }
}

/// A diagram written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDiagram {
    pub path: PathBuf,
    /// `YYYYMMDD_HHMMSS`, as embedded in the file name.
    pub timestamp: String,
}

/// In-place rewrite applied to a freshly written diagram.
pub trait PostProcessor {
    /// Returns whether the file was rewritten.
    fn process(&self, path: &Path) -> image::ImageResult<bool>;
}

/// Leaves files untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPostProcessor;

impl PostProcessor for NoopPostProcessor {
    fn process(&self, _path: &Path) -> image::ImageResult<bool> {
        Ok(false)
    }
}

/// Rotates/flips pixels according to the embedded EXIF orientation.
///
/// Files without an orientation tag (or with the identity orientation) are
/// not rewritten, so they stay byte-identical to the captured bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifOrientation;

impl PostProcessor for ExifOrientation {
    fn process(&self, path: &Path) -> image::ImageResult<bool> {
        let format = ImageFormat::from_path(path)?;
        let mut decoder = ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let orientation = decoder.orientation()?;
        if orientation == Orientation::NoTransforms {
            return Ok(false);
        }

        let mut img = DynamicImage::from_decoder(decoder)?;
        img.apply_orientation(orientation);

        // Encode fully before touching the file so a failure keeps the original.
        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), format)?;
        fs::write(path, encoded)?;
        debug!("Applied {:?} to '{}'", orientation, path.display());
        Ok(true)
    }
}

/// Writes captures into one output folder.
pub struct Ingestion {
    diagram_dir: PathBuf,
    post_processor: Box<dyn PostProcessor>,
}

impl Ingestion {
    /// Ingestion with EXIF orientation normalization.
    pub fn new(diagram_dir: impl Into<PathBuf>) -> Self {
        Self {
            diagram_dir: diagram_dir.into(),
            post_processor: Box::new(ExifOrientation),
        }
    }

    pub fn with_post_processor(self, post_processor: impl PostProcessor + 'static) -> Self {
        Self {
            post_processor: Box::new(post_processor),
            ..self
        }
    }

    /// Save `bytes` stamped with the current local time.
    pub fn save(&self, bytes: &[u8], source_hint: Option<&Path>) -> Result<SavedDiagram, IngestError> {
        self.save_at(bytes, source_hint, Local::now())
    }

    /// Save `bytes` stamped with `now`.
    pub fn save_at(
        &self,
        bytes: &[u8],
        source_hint: Option<&Path>,
        now: DateTime<Local>,
    ) -> Result<SavedDiagram, IngestError> {
        let extension = extension_for(bytes, source_hint);
        let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
        let path = self
            .diagram_dir
            .join(format!("diagram_{}.{}", timestamp, extension));

        fs::create_dir_all(&self.diagram_dir).map_err(|source| IngestError::CreateDir {
            dir: self.diagram_dir.clone(),
            source,
        })?;
        fs::write(&path, bytes).map_err(|source| IngestError::Write {
            path: path.clone(),
            source,
        })?;
        info!("Saved {} bytes to '{}'", bytes.len(), path.display());

        if let Err(e) = self.post_processor.process(&path) {
            warn!("Could not apply EXIF-based rotation: {}", e);
        }

        Ok(SavedDiagram { path, timestamp })
    }
}

/// Pick the file extension (without dot) for a capture.
pub fn extension_for(bytes: &[u8], source_hint: Option<&Path>) -> String {
    if let Some(hint) = source_hint {
        return hint
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string();
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "jpg".to_string(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}
