//! Anchor points for the caption strip under the photo.
//!
//! ```text
//! ┌────────── image ──────────┐
//! │                           │
//! └───────────────────────────┘   ← image bottom
//!  ↕ vertical padding     [logo]
//! Camera line          © Owner 2024
//!  ↕ first-line height + gap
//! Shooting parameters line
//! ```
//!
//! The info block and the copyright hang off the image's edges, not the
//! canvas's; only the logo is centered on the canvas. Text and logo extents
//! come from the renderer's measurement, so this module never fails on its
//! own inputs; it only rejects an invalid [`CanvasLayout`].

use super::LayoutError;
use super::canvas::CanvasLayout;
use super::params::{Dimensions, Point};
use serde::{Deserialize, Serialize};

/// Measured extents and spacing knobs for one image's annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationMetrics {
    /// Extent of the first (camera) line.
    pub first_line: Dimensions,
    /// Extent of the second (shooting parameters) line.
    pub second_line: Dimensions,
    pub copyright: Dimensions,
    /// Logo extent after scaling, if the brand has one.
    pub logo: Option<Dimensions>,
    /// Gap between the two info lines.
    pub line_gap: u32,
    /// Space between the image bottom and the first info line.
    pub vertical_padding: u32,
    /// Vertical shift of the logo relative to the image bottom.
    pub logo_offset: i64,
}

/// Where the renderer draws each annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub info_block_origin: Point,
    /// Distance from the first info line's top to the second's.
    pub info_line_spacing: u32,
    pub copyright_origin: Point,
    pub logo_origin: Option<Point>,
}

impl PlacementRecord {
    pub fn second_line_origin(&self) -> Point {
        Point::new(
            self.info_block_origin.x,
            self.info_block_origin.y + i64::from(self.info_line_spacing),
        )
    }
}

/// Compute annotation anchors for a validated layout.
pub fn place_annotations(
    layout: &CanvasLayout,
    metrics: &AnnotationMetrics,
) -> Result<PlacementRecord, LayoutError> {
    layout.validate()?;
    let image = &layout.image;

    let info_block_origin = Point::new(
        image.origin.x,
        image.bottom() + i64::from(metrics.vertical_padding),
    );
    let info_line_spacing = metrics.first_line.height + metrics.line_gap;

    // Right-aligned to the image's right edge, on the first line's baseline row.
    let copyright_origin = Point::new(
        image.right() - i64::from(metrics.copyright.width),
        info_block_origin.y,
    );

    let logo_origin = metrics.logo.map(|logo| {
        let slack = i64::from(layout.canvas.width) - i64::from(logo.width);
        Point::new(slack.div_euclid(2), image.bottom() + metrics.logo_offset)
    });

    Ok(PlacementRecord {
        info_block_origin,
        info_line_spacing,
        copyright_origin,
        logo_origin,
    })
}
