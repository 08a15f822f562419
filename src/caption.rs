//! Caption text.
//!
//! Builds the three strings drawn under the photo:
//!
//! | Line      | Example                                  |
//! |-----------|------------------------------------------|
//! | camera    | `NIKON Z 6 NIKKOR Z 24-70mm f/4 S`       |
//! | shooting  | `50mm F4  1/250s  ISO400`                |
//! | copyright | `© 2024`                                 |
//!
//! Brand cleanup is a literal, ordered substitution list from
//! [`BrandsConfig`]; each rule sees the output of the previous one.

use crate::config::{AnnotationConfig, BrandsConfig, Substitution};
use crate::metadata::CameraMetadata;
use crate::rational::{Rational, RationalError};
use serde::Serialize;

/// The rendered caption strings for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionLines {
    pub camera: String,
    pub shooting: String,
    pub copyright: String,
}

/// Compose all caption lines for `meta`.
///
/// An empty camera line is replaced with the placeholder so the strip
/// always has two info lines.
pub fn compose_caption(
    meta: &CameraMetadata,
    annotation: &AnnotationConfig,
    brands: &BrandsConfig,
    year: i32,
) -> Result<CaptionLines, RationalError> {
    let mut camera = camera_line(meta, &brands.substitutions);
    if camera.is_empty() {
        camera = annotation.placeholder.clone();
    }
    Ok(CaptionLines {
        camera,
        shooting: shooting_line(meta, &annotation.placeholder)?,
        copyright: copyright_line(&annotation.copyright, year),
    })
}

/// `make model lens`, cleaned up by the brand substitutions.
///
/// A lens model equal to the body model (ignoring case) is left out; some
/// compacts report their own name as the lens.
pub fn camera_line(meta: &CameraMetadata, substitutions: &[Substitution]) -> String {
    let lens = meta.lens_model.as_deref().filter(|lens| {
        !meta
            .model
            .as_deref()
            .is_some_and(|model| model.eq_ignore_ascii_case(lens))
    });

    let joined = [meta.make.as_deref(), meta.model.as_deref(), lens]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let substituted = substitutions
        .iter()
        .fold(joined, |line, rule| line.replace(&rule.pattern, &rule.replacement));

    collapse_whitespace(&substituted)
}

/// `{focal}mm F{aperture}  {exposure}s  ISO{iso}`; each missing component
/// is replaced whole by `placeholder`.
pub fn shooting_line(meta: &CameraMetadata, placeholder: &str) -> Result<String, RationalError> {
    let focal = format_component(meta.focal_length, placeholder, |r| {
        Ok(format!("{}mm", r.to_decimal_string()?))
    })?;
    let aperture = format_component(meta.aperture, placeholder, |r| {
        Ok(format!("F{}", r.to_decimal_string()?))
    })?;
    let exposure = format_component(meta.exposure_time, placeholder, |r| {
        Ok(format!("{}s", r.to_exposure_string()?))
    })?;
    let iso = meta
        .iso
        .map(|iso| format!("ISO{iso}"))
        .unwrap_or_else(|| placeholder.to_string());

    Ok(format!("{focal} {aperture}  {exposure}  {iso}"))
}

/// Fill the `{year}` slot of a copyright template.
pub fn copyright_line(template: &str, year: i32) -> String {
    template.replace("{year}", &year.to_string())
}

fn format_component(
    value: Option<Rational>,
    placeholder: &str,
    render: impl FnOnce(Rational) -> Result<String, RationalError>,
) -> Result<String, RationalError> {
    match value {
        Some(r) => render(r),
        None => Ok(placeholder.to_string()),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
