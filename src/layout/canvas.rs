//! Canvas layout: where a photo sits on its frame.
//!
//! ```text
//! +----------------- canvas ------------------+
//! |  border                                   |
//! |   +----------- available area --------+   |
//! |   |      +---- scaled image ----+     |   |
//! |   |      |                      |     |   |
//! |   |      +----------------------+     |   |
//! |   +-----------------------------------+   |
//! +-------------------------------------------+
//! ```
//!
//! All arithmetic is integer. The scale factor is never materialized as a
//! float: the limiting axis is chosen by cross-multiplication and the other
//! axis is floored from the exact ratio.

use super::LayoutError;
use super::params::{BorderMode, Dimensions, LayoutPolicy, Point};
use serde::{Deserialize, Serialize};

/// Landscape when wider than tall. Square images count as portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn of(size: Dimensions) -> Self {
        if size.width > size.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Where the scaled photo is drawn on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub origin: Point,
    pub size: Dimensions,
}

impl ImagePlacement {
    /// y of the first row below the image.
    pub fn bottom(&self) -> i64 {
        self.origin.y + i64::from(self.size.height)
    }

    /// x of the first column right of the image.
    pub fn right(&self) -> i64 {
        self.origin.x + i64::from(self.size.width)
    }
}

/// Result of [`compute_canvas_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasLayout {
    pub orientation: Orientation,
    pub canvas: Dimensions,
    pub image: ImagePlacement,
}

impl CanvasLayout {
    /// Check that the image is non-empty and lies inside the canvas.
    ///
    /// Layouts from [`compute_canvas_layout`] always pass; this guards
    /// layouts deserialized or assembled by hand.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let degenerate = |msg: &str| Err(LayoutError::DegenerateGeometry(msg.to_string()));
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return degenerate("canvas has zero size");
        }
        if self.image.size.width == 0 || self.image.size.height == 0 {
            return degenerate("image placement has zero size");
        }
        if self.image.origin.x < 0
            || self.image.origin.y < 0
            || self.image.right() > i64::from(self.canvas.width)
            || self.image.bottom() > i64::from(self.canvas.height)
        {
            return degenerate("image placement extends past the canvas");
        }
        Ok(())
    }
}

/// Compute canvas size, scaled image size and centering offsets.
///
/// 1. Orientation from the original (square → portrait).
/// 2. Canvas long edge = `target_long_edge`; short edge = floor(long × short/long of the aspect).
/// 3. Canvas oriented like the original.
/// 4. Available area = canvas minus twice the border on the bordered axes.
/// 5. Largest uniform scale that fits the available area on both axes.
/// 6. Scaled size floored per axis.
/// 7. Offset = floor(slack / 2) + border, so an odd leftover pixel lands on the trailing edge.
///
/// # Examples
/// ```
/// # use framemark::layout::{compute_canvas_layout, Dimensions, Preset, Point};
/// let layout = compute_canvas_layout(Dimensions::new(6000, 4000), &Preset::Classic.policy()).unwrap();
/// assert_eq!(layout.canvas, Dimensions::new(3000, 2000));
/// assert_eq!(layout.image.size, Dimensions::new(2727, 1818));
/// assert_eq!(layout.image.origin, Point::new(136, 91));
/// ```
pub fn compute_canvas_layout(
    original: Dimensions,
    policy: &LayoutPolicy,
) -> Result<CanvasLayout, LayoutError> {
    let degenerate = |msg: String| Err(LayoutError::DegenerateGeometry(msg));

    if original.width == 0 || original.height == 0 {
        return degenerate(format!("original image is {original}"));
    }
    if policy.target_long_edge == 0 {
        return degenerate("target long edge must be positive".to_string());
    }
    let ratio = policy.aspect_ratio;
    if ratio.numerator == 0
        || ratio.denominator == 0
        || (ratio.numerator < 0) != (ratio.denominator < 0)
    {
        return degenerate(format!("aspect ratio {ratio} must be positive"));
    }

    // Aspect as long:short regardless of how it was written.
    let (a, b) = (
        u128::from(ratio.numerator.unsigned_abs()),
        u128::from(ratio.denominator.unsigned_abs()),
    );
    let (long_part, short_part) = (a.max(b), a.min(b));
    let long = policy.target_long_edge;
    let short = (u128::from(long) * short_part / long_part) as u32;
    if short == 0 {
        return degenerate(format!("aspect ratio {ratio} leaves no short edge at {long} px"));
    }

    let orientation = Orientation::of(original);
    let canvas = match orientation {
        Orientation::Landscape => Dimensions::new(long, short),
        Orientation::Portrait => Dimensions::new(short, long),
    };

    let border = u64::from(policy.border_thickness);
    if 2 * border >= u64::from(canvas.width) || 2 * border >= u64::from(canvas.height) {
        return degenerate(format!(
            "border of {border} px leaves no room on a {canvas} canvas"
        ));
    }
    let border = policy.border_thickness;
    let (border_x, border_y) = match (policy.border_mode, orientation) {
        (BorderMode::Uniform, _) => (border, border),
        (BorderMode::LongEdgeOnly, Orientation::Landscape) => (border, 0),
        (BorderMode::LongEdgeOnly, Orientation::Portrait) => (0, border),
    };
    let available = Dimensions::new(canvas.width - 2 * border_x, canvas.height - 2 * border_y);

    let size = fit_within(original, available);
    if size.width == 0 || size.height == 0 {
        return degenerate(format!("{original} collapses to {size} inside {available}"));
    }

    let origin = Point::new(
        i64::from((available.width - size.width) / 2 + border_x),
        i64::from((available.height - size.height) / 2 + border_y),
    );

    let layout = CanvasLayout {
        orientation,
        canvas,
        image: ImagePlacement { origin, size },
    };
    tracing::debug!(
        %original,
        canvas = %layout.canvas,
        image = %layout.image.size,
        x = origin.x,
        y = origin.y,
        "computed canvas layout"
    );
    Ok(layout)
}

/// Largest uniform scale of `source` that fits in `area`, floored per axis.
fn fit_within(source: Dimensions, area: Dimensions) -> Dimensions {
    let (sw, sh) = (u128::from(source.width), u128::from(source.height));
    let (aw, ah) = (u128::from(area.width), u128::from(area.height));

    // aw/sw <= ah/sh  ⇔  aw·sh <= ah·sw : width is the limiting axis.
    if aw * sh <= ah * sw {
        Dimensions::new(area.width, (sh * aw / sw) as u32)
    } else {
        Dimensions::new((sw * ah / sh) as u32, area.height)
    }
}
