//! Camera metadata resolution.
//!
//! Turns a decoded [`TagDirectory`] into the handful of fields the caption
//! needs. Every field degrades to `None` when its tag is missing or
//! unreadable; a resolution never fails as a whole.
//!
//! ## Fixed-lens bodies
//!
//! A camera that writes no `LensMake` (or an empty one) is treated as a
//! fixed-lens body. For those, the lens model is dropped, and so is the
//! F-number unless the model is on the brand table's aperture allow-list.

use crate::config::BrandsConfig;
use crate::exif::{Directory, ExifError, TagDirectory, tag};
use crate::rational::Rational;
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// EXIF `DateTimeOriginal` layout.
pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    #[error(transparent)]
    InvalidEncoding(#[from] ExifError),
    #[error("invalid capture time {0:?}, expected YYYY:MM:DD HH:MM:SS")]
    InvalidTimestamp(String),
}

/// Caption-relevant camera facts for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CameraMetadata {
    pub make: Option<String>,
    pub model: Option<String>,
    /// `None` for fixed-lens bodies.
    pub lens_model: Option<String>,
    pub aperture: Option<Rational>,
    pub exposure_time: Option<Rational>,
    pub iso: Option<u32>,
    pub focal_length: Option<Rational>,
    pub capture_time: Option<NaiveDateTime>,
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` timestamp.
pub fn parse_capture_time(raw: &str) -> Result<NaiveDateTime, MetadataError> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, CAPTURE_TIME_FORMAT)
        .map_err(|_| MetadataError::InvalidTimestamp(trimmed.to_string()))
}

/// Resolve metadata, logging a warning for each field that had to be dropped.
pub fn resolve(dir: &TagDirectory, brands: &BrandsConfig) -> CameraMetadata {
    let (metadata, issues) = resolve_report(dir, brands);
    for issue in &issues {
        tracing::warn!(%issue, "dropping unreadable metadata field");
    }
    metadata
}

/// Resolve metadata and return the per-field problems alongside it.
pub fn resolve_report(
    dir: &TagDirectory,
    brands: &BrandsConfig,
) -> (CameraMetadata, Vec<MetadataError>) {
    let mut issues = Vec::new();

    // An unreadable LensMake is still a LensMake: only a missing or blank
    // one marks the body as fixed-lens.
    let fixed_lens = match dir.text(Directory::Capture, tag::LENS_MAKE) {
        Ok(lens_make) => lens_make.is_none_or(|s| s.trim().is_empty()),
        Err(e) => {
            issues.push(MetadataError::from(e));
            false
        }
    };

    let mut text = |directory: Directory, tag: u16| -> Option<String> {
        match dir.text(directory, tag) {
            Ok(value) => value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            Err(e) => {
                issues.push(MetadataError::from(e));
                None
            }
        }
    };

    let make = text(Directory::Primary, tag::MAKE);
    let model = text(Directory::Primary, tag::MODEL);

    let lens_model = if fixed_lens {
        None
    } else {
        text(Directory::Capture, tag::LENS_MODEL)
    };

    let raw_time = text(Directory::Capture, tag::DATE_TIME_ORIGINAL);
    let capture_time = raw_time.and_then(|raw| match parse_capture_time(&raw) {
        Ok(t) => Some(t),
        Err(e) => {
            issues.push(e);
            None
        }
    });

    let aperture_allowed = !fixed_lens
        || model
            .as_deref()
            .is_some_and(|m| brands.allows_fixed_lens_aperture(m));
    let aperture = dir
        .rational(Directory::Capture, tag::F_NUMBER)
        .filter(|_| aperture_allowed);

    let metadata = CameraMetadata {
        make,
        model,
        lens_model,
        aperture,
        exposure_time: dir.rational(Directory::Capture, tag::EXPOSURE_TIME),
        iso: dir.unsigned(Directory::Capture, tag::ISO_SPEED_RATINGS),
        focal_length: dir.rational(Directory::Capture, tag::FOCAL_LENGTH),
        capture_time,
    };
    (metadata, issues)
}
