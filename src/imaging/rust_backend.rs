//! Production collaborators.
//!
//! ## Crate mapping
//!
//! | Operation | Implementation |
//! |---|---|
//! | Identify (JPEG, PNG, TIFF) | `image::image_dimensions` (header only, no decode) |
//! | EXIF blob | `std::fs::read` + [`find_exif_blob`] |
//! | Text extent | [`EstimatedTextMeasure`], fixed advance per character |
//! | Render | [`JsonRenderer`], one `serde_json` line per plan |

use super::backend::{BackendError, ImageSource, Renderer, TextMeasure};
use crate::exif::container::find_exif_blob;
use crate::layout::Dimensions;
use crate::process::ImagePlan;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Reads input files with the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {e}",
                path.display()
            ))
        })?;
        Ok(Dimensions::new(width, height))
    }

    fn read_exif(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError> {
        let data = std::fs::read(path)?;
        Ok(find_exif_blob(&data).map(<[u8]>::to_vec))
    }
}

/// Width estimate from a fixed per-character advance.
///
/// Good enough to anchor right-aligned text without a font rasterizer; a
/// renderer that shapes glyphs should supply its own [`TextMeasure`].
#[derive(Debug, Clone, Copy)]
pub struct EstimatedTextMeasure {
    /// Glyph advance in thousandths of the font size.
    pub advance_per_mille: u32,
}

impl Default for EstimatedTextMeasure {
    fn default() -> Self {
        Self {
            advance_per_mille: 550,
        }
    }
}

impl TextMeasure for EstimatedTextMeasure {
    fn measure(&self, text: &str, font_size: u32) -> Dimensions {
        let chars = text.chars().count() as u64;
        let width =
            (chars * u64::from(font_size) * u64::from(self.advance_per_mille)).div_ceil(1000);
        Dimensions::new(u32::try_from(width).unwrap_or(u32::MAX), font_size)
    }
}

/// Writes every plan as a single JSON line.
pub struct JsonRenderer<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn render(&self, plan: &ImagePlan) -> Result<(), BackendError> {
        let line = serde_json::to_string(plan)
            .map_err(|e| BackendError::ProcessingFailed(format!("Failed to encode plan: {e}")))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| BackendError::ProcessingFailed("Renderer output poisoned".to_string()))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
