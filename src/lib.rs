//! # Framemark
//!
//! Camera metadata extraction and deterministic frame layout for annotated
//! photo exports. Framemark reads a photo's EXIF block, resolves the camera
//! facts a caption needs, and computes a pixel-exact layout: canvas size,
//! where the scaled photo sits, and where the caption lines, copyright mark
//! and brand logo go. Drawing the pixels is left to a renderer.
//!
//! # Architecture: Pure Core, Thin Edges
//!
//! ```text
//! bytes ──→ exif ──→ TagDirectory ──→ metadata ──→ CameraMetadata ──→ caption
//! dimensions + LayoutPolicy ──→ layout::compute_canvas_layout ──→ CanvasLayout
//! CanvasLayout + measured extents ──→ layout::place_annotations ──→ PlacementRecord
//! ```
//!
//! Everything in that diagram is a pure function over immutable inputs.
//! File access, text measurement and rendering sit behind the traits in
//! [`imaging`], so the whole pipeline is testable without touching disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`rational`] | Exact EXIF rationals and their display forms |
//! | [`exif`] | TIFF/EXIF tag directory decoder and JPEG container scan |
//! | [`metadata`] | Tag directory → `CameraMetadata`, field by field |
//! | [`caption`] | Camera line, shooting-parameter line, copyright line |
//! | [`layout`] | Canvas layout engine, presets, annotation placement |
//! | [`imaging`] | Collaborator traits and the `image`-crate backend |
//! | [`process`] | Per-image planning and the parallel batch driver |
//! | [`config`] | `config.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Absence Is Data
//!
//! A missing tag is `None` in [`metadata::CameraMetadata`], never a string
//! like `"Unknown"`. Placeholder text is chosen by the caption formatter from
//! configuration, so "the camera did not record ISO" stays testable.
//!
//! ## Integer Geometry
//!
//! Layout math is done in integers with explicit floors. The same inputs give
//! the same layout on every platform, and an odd leftover pixel always lands
//! on the trailing edge.
//!
//! ## Styles Are Data
//!
//! Watermark styles are [`layout::Preset`] values producing a
//! [`layout::LayoutPolicy`], not separate code paths. Brand quirks (logo
//! lookup, name cleanup, fixed-lens aperture allow-list) live in
//! [`config::BrandsConfig`] and are passed in explicitly.

pub mod caption;
pub mod config;
pub mod exif;
pub mod imaging;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod process;
pub mod rational;

#[cfg(test)]
pub(crate) mod test_helpers;
