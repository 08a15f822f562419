//! Per-image planning and the batch driver.
//!
//! Each input file goes through the same independent pipeline:
//!
//! ```text
//! identify ─┐
//! read EXIF ─→ parse tags → resolve metadata → caption lines
//!           └→ canvas layout ───────────────→ measure → placement → ImagePlan
//! ```
//!
//! Nothing touches pixels. The resulting [`ImagePlan`] carries everything a
//! renderer needs: the canvas, where the scaled photo goes, the caption
//! strings and their anchors, the logo asset, and the tag directory to embed
//! in the output file.
//!
//! ## Parallel Processing
//!
//! Plans are independent, so [`plan_batch`] fans out with rayon. Progress is
//! reported through an optional `mpsc` channel so a printer thread can stream
//! lines while workers run.
//!
//! ## Failure policy
//!
//! | Problem | Effect |
//! |---|---|
//! | unreadable file, malformed EXIF directory, impossible layout | that image fails |
//! | no EXIF segment | empty tag directory, every field absent |
//! | bad text tag or timestamp | that field absent, warning logged |
//! | logo asset cannot be identified | no logo, warning logged |

use crate::caption::{CaptionLines, compose_caption};
use crate::config::{AnnotationConfig, BrandsConfig, FramemarkConfig};
use crate::exif::{ExifError, TagDirectory, parse_tag_directory};
use crate::imaging::{BackendError, ImageSource, Renderer, TextMeasure};
use crate::layout::{
    AnnotationMetrics, CanvasLayout, Dimensions, LayoutError, LayoutPolicy, PlacementRecord,
    compute_canvas_layout, place_annotations,
};
use crate::metadata::{CameraMetadata, resolve};
use crate::rational::RationalError;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Render failed: {0}")]
    Render(#[from] BackendError),
    #[error("{}: {source}", .path.display())]
    Source { path: PathBuf, source: BackendError },
    #[error("{}: {source}", .path.display())]
    Exif { path: PathBuf, source: ExifError },
    #[error("{}: {source}", .path.display())]
    Caption { path: PathBuf, source: RationalError },
    #[error("{}: {source}", .path.display())]
    Layout { path: PathBuf, source: LayoutError },
}

/// Everything planning needs besides the collaborators.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub policy: LayoutPolicy,
    pub annotation: AnnotationConfig,
    pub brands: BrandsConfig,
    /// Relative logo paths resolve against this directory.
    pub asset_root: PathBuf,
    /// Fills the copyright template.
    pub year: i32,
}

impl PlanContext {
    pub fn new(config: &FramemarkConfig, asset_root: impl Into<PathBuf>, year: i32) -> Self {
        Self {
            policy: config.layout.policy(),
            annotation: config.annotation.clone(),
            brands: config.brands.clone(),
            asset_root: asset_root.into(),
            year,
        }
    }

    pub fn with_policy(mut self, policy: LayoutPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A brand logo ready to composite: where to load it and its scaled size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoAsset {
    pub path: PathBuf,
    pub size: Dimensions,
}

/// The full render recipe for one input image.
#[derive(Debug, Clone, Serialize)]
pub struct ImagePlan {
    pub source: PathBuf,
    pub original: Dimensions,
    pub metadata: CameraMetadata,
    pub caption: CaptionLines,
    pub layout: CanvasLayout,
    pub placement: PlacementRecord,
    pub logo: Option<LogoAsset>,
    /// Source tags with output size and resolution rewritten.
    #[serde(skip)]
    pub output_tags: TagDirectory,
}

/// Progress reported by [`plan_batch`], one per input.
#[derive(Debug, Clone)]
pub enum PlanEvent {
    Planned {
        index: usize,
        source: PathBuf,
        canvas: Dimensions,
        camera_line: String,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// Plan one image.
pub fn plan_image(
    source: &impl ImageSource,
    measure: &impl TextMeasure,
    path: &Path,
    ctx: &PlanContext,
) -> Result<ImagePlan, ProcessError> {
    let original = source.identify(path).map_err(|e| ProcessError::Source {
        path: path.to_path_buf(),
        source: e,
    })?;

    let blob = source.read_exif(path).map_err(|e| ProcessError::Source {
        path: path.to_path_buf(),
        source: e,
    })?;
    let tags = match blob {
        Some(blob) => parse_tag_directory(&blob).map_err(|e| ProcessError::Exif {
            path: path.to_path_buf(),
            source: e,
        })?,
        None => {
            tracing::debug!(path = %path.display(), "no EXIF segment");
            TagDirectory::default()
        }
    };

    let metadata = resolve(&tags, &ctx.brands);
    let caption = compose_caption(&metadata, &ctx.annotation, &ctx.brands, ctx.year).map_err(
        |e| ProcessError::Caption {
            path: path.to_path_buf(),
            source: e,
        },
    )?;

    let layout_err = |e| ProcessError::Layout {
        path: path.to_path_buf(),
        source: e,
    };
    let layout = compute_canvas_layout(original, &ctx.policy).map_err(layout_err)?;

    let logo = metadata
        .make
        .as_deref()
        .and_then(|make| find_logo(source, make, ctx));

    let annotation = &ctx.annotation;
    let metrics = AnnotationMetrics {
        first_line: measure.measure(&caption.camera, annotation.info_font_size),
        second_line: measure.measure(&caption.shooting, annotation.info_font_size),
        copyright: measure.measure(&caption.copyright, annotation.copyright_font_size),
        logo: logo.as_ref().map(|l| l.size),
        line_gap: annotation.line_gap,
        vertical_padding: annotation.vertical_padding,
        logo_offset: annotation.logo_offset,
    };
    let placement = place_annotations(&layout, &metrics).map_err(layout_err)?;

    Ok(ImagePlan {
        source: path.to_path_buf(),
        original,
        output_tags: tags.for_output(layout.canvas),
        metadata,
        caption,
        layout,
        placement,
        logo,
    })
}

/// Look up and size the logo for `make`. A missing or unreadable asset
/// means no logo, not a failed image.
fn find_logo(source: &impl ImageSource, make: &str, ctx: &PlanContext) -> Option<LogoAsset> {
    let relative = ctx.brands.logo_for(make)?;
    let path = ctx.asset_root.join(relative);
    let natural = match source.identify(&path) {
        Ok(size) => size,
        Err(e) => {
            tracing::warn!(make, logo = %path.display(), error = %e, "logo unavailable, skipping");
            return None;
        }
    };
    let size = natural.scaled_to_height(ctx.annotation.logo_height)?;
    Some(LogoAsset { path, size })
}

/// Plan many images in parallel. Results keep the input order.
pub fn plan_batch(
    source: &impl ImageSource,
    measure: &impl TextMeasure,
    paths: &[PathBuf],
    ctx: &PlanContext,
    progress: Option<Sender<PlanEvent>>,
) -> Vec<Result<ImagePlan, ProcessError>> {
    paths
        .par_iter()
        .enumerate()
        .map(|(i, path)| {
            let index = i + 1;
            let result = plan_image(source, measure, path, ctx);
            if let Some(tx) = &progress {
                let event = match &result {
                    Ok(plan) => PlanEvent::Planned {
                        index,
                        source: path.clone(),
                        canvas: plan.layout.canvas,
                        camera_line: plan.caption.camera.clone(),
                    },
                    Err(e) => PlanEvent::Failed {
                        index,
                        source: path.clone(),
                        error: e.to_string(),
                    },
                };
                // Receiver gone means nobody is listening; keep planning.
                let _ = tx.send(event);
            }
            result
        })
        .collect()
}

/// Hand every plan to the renderer, stopping at the first failure.
pub fn render_plans(renderer: &impl Renderer, plans: &[ImagePlan]) -> Result<(), ProcessError> {
    for plan in plans {
        renderer.render(plan)?;
    }
    Ok(())
}

/// Write all plans as a pretty JSON array, creating parent directories.
pub fn write_manifest(path: &Path, plans: &[ImagePlan]) -> Result<(), ProcessError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(plans)?;
    std::fs::write(path, json)?;
    Ok(())
}
