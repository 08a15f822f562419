//! Collaborator traits and shared error type.
//!
//! The core never touches pixels or fonts. Everything it needs from the
//! outside world goes through three narrow traits:
//!
//! | Trait | Provides |
//! |---|---|
//! | [`ImageSource`] | pixel dimensions and the raw EXIF blob of an input file |
//! | [`TextMeasure`] | the pixel extent of a caption string at a font size |
//! | [`Renderer`] | consumes a finished [`ImagePlan`] |
//!
//! The production implementations live in
//! [`rust_backend`](super::rust_backend). All traits are `Sync` so one
//! instance can be shared across rayon workers.

use crate::layout::Dimensions;
use crate::process::ImagePlan;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Reads facts about input images.
pub trait ImageSource: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read the embedded TIFF-structured EXIF blob, if the file has one.
    fn read_exif(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError>;
}

/// Measures rendered text.
pub trait TextMeasure: Sync {
    fn measure(&self, text: &str, font_size: u32) -> Dimensions;
}

/// Draws (or records) a planned output image.
pub trait Renderer: Sync {
    fn render(&self, plan: &ImagePlan) -> Result<(), BackendError>;
}
