//! Collaborators at the edge of the core: reading input files, measuring
//! text, and handing finished plans to a renderer.
//!
//! | Concern | Trait | Production type |
//! |---|---|---|
//! | **Identify + EXIF** | [`ImageSource`] | [`RustBackend`] (`image` crate) |
//! | **Text extent** | [`TextMeasure`] | [`EstimatedTextMeasure`] |
//! | **Render** | [`Renderer`] | [`JsonRenderer`] |

pub mod backend;
pub mod rust_backend;

pub use backend::{BackendError, ImageSource, Renderer, TextMeasure};
pub use rust_backend::{EstimatedTextMeasure, JsonRenderer, RustBackend};
