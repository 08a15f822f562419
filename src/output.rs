//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image leads with its positional index and its camera line, the
//! thing a photographer recognizes; the file path follows as indented
//! `Source:` context.
//!
//! ## Plan
//!
//! ```text
//! 001 NIKON Z 6 NIKKOR Z 24-70mm f/4 S
//!     Source: shots/DSC_0001.jpg
//!     Canvas: 3000x2000
//! 002 (broken.jpg)
//!     Source: shots/broken.jpg
//!     Error: shots/broken.jpg: malformed Primary directory: ...
//!
//! Planned 1 image, 1 failed
//! ```
//!
//! ## Inspect
//!
//! ```text
//! DSC_0001.jpg (6000x4000)
//!     Make: NIKON CORPORATION
//!     Aperture: F4
//!     ...
//! Caption
//!     NIKON Z 6 NIKKOR Z 24-70mm f/4 S
//!     50mm F4  1/250s  ISO400
//!     © 2024
//! Layout
//!     Canvas: 3000x2000
//!     Image: 2727x1818 at (136, 91)
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes the lines out. Format
//! functions are pure: no I/O, no side effects.

use crate::layout::Point;
use crate::metadata::CameraMetadata;
use crate::process::{ImagePlan, PlanEvent};
use crate::rational::Rational;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format an image line: known cameras show the camera line, otherwise the
/// filename in parens.
///
/// ```text
/// 001 FUJIFILM X100V
/// 002 (scan-0042.jpg)
/// ```
fn image_line(index: usize, camera: Option<&str>, filename: &str) -> String {
    match camera {
        Some(c) if !c.is_empty() => format!("{} {}", format_index(index), c),
        _ => format!("{} ({})", format_index(index), filename),
    }
}

fn point(p: Point) -> String {
    format!("({}, {})", p.x, p.y)
}

/// Decimal when representable, raw fraction otherwise.
fn rational(r: Rational) -> String {
    r.to_decimal_string().unwrap_or_else(|_| r.to_string())
}

fn or_none<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| "(none)".to_string())
}

// ============================================================================
// plan
// ============================================================================

/// Format a single plan progress event as display lines.
pub fn format_plan_event(event: &PlanEvent, placeholder: &str) -> Vec<String> {
    match event {
        PlanEvent::Planned {
            index,
            source,
            canvas,
            camera_line,
        } => {
            let camera = Some(camera_line.as_str()).filter(|c| *c != placeholder);
            vec![
                image_line(*index, camera, &file_name(source)),
                format!("{}Source: {}", indent(1), source.display()),
                format!("{}Canvas: {}", indent(1), canvas),
            ]
        }
        PlanEvent::Failed {
            index,
            source,
            error,
        } => vec![
            image_line(*index, None, &file_name(source)),
            format!("{}Source: {}", indent(1), source.display()),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

/// One-line batch summary.
pub fn format_plan_summary(planned: usize, failed: usize) -> String {
    let noun = if planned == 1 { "image" } else { "images" };
    if failed == 0 {
        format!("Planned {planned} {noun}")
    } else {
        format!("Planned {planned} {noun}, {failed} failed")
    }
}

// ============================================================================
// inspect
// ============================================================================

fn format_metadata(meta: &CameraMetadata) -> Vec<String> {
    let text = |v: &Option<String>| or_none(v.as_deref(), str::to_string);
    let i = indent(1);
    vec![
        format!("{i}Make: {}", text(&meta.make)),
        format!("{i}Model: {}", text(&meta.model)),
        format!("{i}Lens: {}", text(&meta.lens_model)),
        format!("{i}Aperture: {}", or_none(meta.aperture, |r| format!("F{}", rational(r)))),
        format!(
            "{i}Exposure: {}",
            or_none(meta.exposure_time, |r| match r.to_exposure_string() {
                Ok(s) => format!("{s}s"),
                Err(_) => r.to_string(),
            })
        ),
        format!("{i}ISO: {}", or_none(meta.iso, |n| n.to_string())),
        format!(
            "{i}Focal length: {}",
            or_none(meta.focal_length, |r| format!("{}mm", rational(r)))
        ),
        format!(
            "{i}Captured: {}",
            or_none(meta.capture_time, |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        ),
    ]
}

/// Format everything known about one planned image.
pub fn format_inspect(plan: &ImagePlan) -> Vec<String> {
    let i = indent(1);
    let mut lines = vec![format!("{} ({})", file_name(&plan.source), plan.original)];
    lines.extend(format_metadata(&plan.metadata));

    lines.push("Caption".to_string());
    lines.push(format!("{i}{}", plan.caption.camera));
    lines.push(format!("{i}{}", plan.caption.shooting));
    lines.push(format!("{i}{}", plan.caption.copyright));

    let layout = &plan.layout;
    let placement = &plan.placement;
    lines.push("Layout".to_string());
    lines.push(format!("{i}Canvas: {}", layout.canvas));
    lines.push(format!(
        "{i}Image: {} at {}",
        layout.image.size,
        point(layout.image.origin)
    ));
    lines.push(format!(
        "{i}Info: {}, line spacing {}",
        point(placement.info_block_origin),
        placement.info_line_spacing
    ));
    lines.push(format!("{i}Copyright: {}", point(placement.copyright_origin)));
    let logo = match (&plan.logo, placement.logo_origin) {
        (Some(logo), Some(origin)) => format!(
            "{} {} at {}",
            logo.path.display(),
            logo.size,
            point(origin)
        ),
        _ => "(none)".to_string(),
    };
    lines.push(format!("{i}Logo: {logo}"));
    lines
}

/// Print inspect output to stdout.
pub fn print_inspect(plan: &ImagePlan) {
    for line in format_inspect(plan) {
        println!("{}", line);
    }
}
