//! Frame geometry. Pure functions over integers; no I/O, no pixels.
//!
//! The module is split into:
//! - **Parameters**: [`Dimensions`], [`Point`], [`LayoutPolicy`] and the named [`Preset`]s
//! - **Canvas**: [`compute_canvas_layout`]: canvas size, scaled image size, centering offsets
//! - **Placement**: [`place_annotations`]: anchors for the caption lines, copyright and logo
//!
//! Every function is deterministic in its inputs; all rounding is integer
//! floor so identical inputs give bit-identical layouts on every platform.

mod canvas;
mod params;
mod placement;

pub use canvas::{CanvasLayout, ImagePlacement, Orientation, compute_canvas_layout};
pub use params::{BorderMode, Dimensions, LayoutPolicy, Point, Preset};
pub use placement::{AnnotationMetrics, PlacementRecord, place_annotations};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}
