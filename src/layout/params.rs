//! Parameter types for frame layout.
//!
//! These structs describe *what* frame to build, not *how*. A
//! [`LayoutPolicy`] is plain data: every historical watermark style is one
//! [`Preset`] value rather than a separate code path.

use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel size of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn long_edge(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn short_edge(self) -> u32 {
        self.width.min(self.height)
    }

    /// Scale to `height`, keeping the aspect ratio; width is floored.
    /// `None` for a zero-height source.
    pub fn scaled_to_height(self, height: u32) -> Option<Dimensions> {
        if self.height == 0 {
            return None;
        }
        let width = u64::from(self.width) * u64::from(height) / u64::from(self.height);
        Some(Dimensions::new(u32::try_from(width).ok()?, height))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Top-left anchor in canvas pixels. Signed: text wider than the image
/// legitimately lands left of the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Which canvas axes the border is subtracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderMode {
    /// Border on all four sides.
    #[default]
    Uniform,
    /// Border only at the two ends of the image's long axis.
    LongEdgeOnly,
}

/// Canvas size, aspect and border rules for one framed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPolicy {
    /// Canvas long edge in pixels.
    pub target_long_edge: u32,
    /// Canvas aspect as long:short. `2:3` is read the same as `3:2`.
    pub aspect_ratio: Rational,
    pub border_thickness: u32,
    pub border_mode: BorderMode,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Preset::Classic.policy()
    }
}

/// Named layout styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 3:2 canvas, 3000 px long edge, fixed 91 px uniform border, photo centered.
    ///
    /// At the default 3000x2000 canvas this matches a 1/1.1 downscale of the
    /// short edge; the border does not scale with the canvas.
    Classic,
    /// 3:2 canvas, no border: the photo touches the canvas on its limiting axis.
    FullBleed,
    /// Border only at the ends of the long axis.
    Gallery,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Classic, Preset::FullBleed, Preset::Gallery];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::FullBleed => "full-bleed",
            Preset::Gallery => "gallery",
        }
    }

    pub fn policy(self) -> LayoutPolicy {
        // 91 px is what a 1.1 downscale leaves on a 2000 px short edge.
        let (border_thickness, border_mode) = match self {
            Preset::Classic => (91, BorderMode::Uniform),
            Preset::FullBleed => (0, BorderMode::Uniform),
            Preset::Gallery => (91, BorderMode::LongEdgeOnly),
        };
        LayoutPolicy {
            target_long_edge: 3000,
            aspect_ratio: Rational::new(3, 2),
            border_thickness,
            border_mode,
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{s}', expected one of: {}", names.join(", "))
            })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
