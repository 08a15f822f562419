//! Framemark configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged on top key by key,
//! and the result is deserialized and validated. User files are sparse:
//! override just the values you want.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! target_long_edge = 3000     # Canvas long edge in pixels
//! aspect_ratio = [3, 2]       # Canvas aspect, long:short
//! border_thickness = 91       # Border in pixels
//! border_mode = "uniform"     # "uniform" or "long-edge-only"
//!
//! [annotation]
//! info_font_size = 26         # Camera and shooting-parameter lines
//! copyright_font_size = 36
//! line_gap = 4                # Between the two info lines
//! vertical_padding = 8        # Between image bottom and first info line
//! logo_height = 70            # Logos are scaled to this height
//! logo_offset = 0             # Logo shift relative to image bottom
//! copyright = "© {year}"
//! placeholder = "-"           # Shown for missing EXIF fields
//!
//! [brands]
//! aperture_allow_list = ["GR III", "GR IIIx"]
//! substitutions = [
//!     { pattern = "NIKON CORPORATION NIKON", replacement = "NIKON" },
//!     { pattern = "Fujifilm Fujinon", replacement = "" },
//!     { pattern = "RICOH IMAGING COMPANY, LTD.", replacement = "" },
//! ]
//!
//! [brands.logos]
//! "NIKON CORPORATION" = "logo/nikon_logo.jpg"
//! "FUJIFILM" = "logo/fuji_logo.jpg"
//! "RICOH IMAGING COMPANY, LTD." = "logo/ricoh_logo.jpg"
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::layout::{BorderMode, LayoutPolicy};
use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete configuration: layout, annotation knobs, brand table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramemarkConfig {
    pub layout: LayoutConfig,
    pub annotation: AnnotationConfig,
    pub brands: BrandsConfig,
    pub processing: ProcessingConfig,
}

impl FramemarkConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.into()));
        if self.layout.target_long_edge == 0 {
            return invalid("layout.target_long_edge must be positive");
        }
        if self.layout.aspect_ratio[0] == 0 || self.layout.aspect_ratio[1] == 0 {
            return invalid("layout.aspect_ratio values must be non-zero");
        }
        if self.annotation.info_font_size == 0 || self.annotation.copyright_font_size == 0 {
            return invalid("annotation font sizes must be positive");
        }
        if self.annotation.logo_height == 0 {
            return invalid("annotation.logo_height must be positive");
        }
        if self.brands.substitutions.iter().any(|s| s.pattern.is_empty()) {
            return invalid("brands.substitutions patterns must not be empty");
        }
        Ok(())
    }
}

/// Canvas geometry, flattened into TOML-friendly types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub target_long_edge: u32,
    /// Aspect ratio as `[long, short]`, e.g. `[3, 2]`.
    pub aspect_ratio: [u32; 2],
    pub border_thickness: u32,
    pub border_mode: BorderMode,
}

impl LayoutConfig {
    pub fn policy(&self) -> LayoutPolicy {
        LayoutPolicy {
            target_long_edge: self.target_long_edge,
            aspect_ratio: Rational::new(
                i64::from(self.aspect_ratio[0]),
                i64::from(self.aspect_ratio[1]),
            ),
            border_thickness: self.border_thickness,
            border_mode: self.border_mode,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let policy = LayoutPolicy::default();
        Self {
            target_long_edge: policy.target_long_edge,
            aspect_ratio: [
                policy.aspect_ratio.numerator as u32,
                policy.aspect_ratio.denominator as u32,
            ],
            border_thickness: policy.border_thickness,
            border_mode: policy.border_mode,
        }
    }
}

/// Caption strip settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationConfig {
    pub info_font_size: u32,
    pub copyright_font_size: u32,
    pub line_gap: u32,
    pub vertical_padding: u32,
    pub logo_height: u32,
    pub logo_offset: i64,
    /// Copyright template; `{year}` is replaced with the current year.
    pub copyright: String,
    /// Text shown in place of a missing EXIF value.
    pub placeholder: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            info_font_size: 26,
            copyright_font_size: 36,
            line_gap: 4,
            vertical_padding: 8,
            logo_height: 70,
            logo_offset: 0,
            copyright: "© {year}".to_string(),
            placeholder: "-".to_string(),
        }
    }
}

/// One literal find/replace applied to the camera line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,
}

impl Substitution {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Brand-specific normalization and logo lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandsConfig {
    /// Fixed-lens models whose F-number is still shown.
    pub aperture_allow_list: Vec<String>,
    /// Applied to the camera line in this order.
    pub substitutions: Vec<Substitution>,
    /// EXIF make → logo asset path.
    pub logos: BTreeMap<String, String>,
}

impl BrandsConfig {
    pub fn allows_fixed_lens_aperture(&self, model: &str) -> bool {
        self.aperture_allow_list
            .iter()
            .any(|m| m.trim().eq_ignore_ascii_case(model.trim()))
    }

    pub fn logo_for(&self, make: &str) -> Option<&str> {
        self.logos.get(make.trim()).map(String::as_str)
    }
}

impl Default for BrandsConfig {
    fn default() -> Self {
        Self {
            aperture_allow_list: vec!["GR III".to_string(), "GR IIIx".to_string()],
            substitutions: vec![
                Substitution::new("NIKON CORPORATION NIKON", "NIKON"),
                Substitution::new("Fujifilm Fujinon", ""),
                Substitution::new("RICOH IMAGING COMPANY, LTD.", ""),
            ],
            logos: BTreeMap::from([
                (
                    "NIKON CORPORATION".to_string(),
                    "logo/nikon_logo.jpg".to_string(),
                ),
                ("FUJIFILM".to_string(), "logo/fuji_logo.jpg".to_string()),
                (
                    "RICOH IMAGING COMPANY, LTD.".to_string(),
                    "logo/ricoh_logo.jpg".to_string(),
                ),
            ]),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(FramemarkConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<FramemarkConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FramemarkConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file.
///
/// A missing file yields the stock defaults; a file that exists but fails
/// to parse or validate is an error.
pub fn load_config(path: &Path) -> Result<FramemarkConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using stock defaults");
        return resolve_config(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Framemark Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Canvas layout
# ---------------------------------------------------------------------------
[layout]
# Canvas long edge in pixels. The canvas is oriented like the photo:
# landscape photos get a landscape canvas, portrait and square a portrait one.
target_long_edge = 3000

# Canvas aspect ratio as [long, short]. The short edge is floored.
aspect_ratio = [3, 2]

# Border in pixels between the canvas edge and the photo's available area.
border_thickness = 91

# "uniform" borders all four sides; "long-edge-only" only the two ends of
# the photo's long axis.
border_mode = "uniform"

# ---------------------------------------------------------------------------
# Caption strip
# ---------------------------------------------------------------------------
[annotation]
# Font size of the camera line and the shooting-parameter line.
info_font_size = 26

# Font size of the copyright mark.
copyright_font_size = 36

# Gap between the two info lines, in pixels.
line_gap = 4

# Space between the bottom of the photo and the first info line.
vertical_padding = 8

# Brand logos are scaled to this height, keeping their aspect ratio.
logo_height = 70

# Vertical shift of the logo relative to the photo's bottom edge.
logo_offset = 0

# Copyright text. {year} is replaced with the current year.
copyright = "© {year}"

# Shown in place of EXIF values the camera did not record.
placeholder = "-"

# ---------------------------------------------------------------------------
# Brands
# ---------------------------------------------------------------------------
[brands]
# Fixed-lens cameras normally hide their F-number; these models keep it.
aperture_allow_list = ["GR III", "GR IIIx"]

# Literal replacements applied to "make model lens", in order.
# Later rules see the output of earlier ones.
substitutions = [
    { pattern = "NIKON CORPORATION NIKON", replacement = "NIKON" },
    { pattern = "Fujifilm Fujinon", replacement = "" },
    { pattern = "RICOH IMAGING COMPANY, LTD.", replacement = "" },
]

# EXIF make -> logo image. Relative paths resolve against the directory
# holding this config file.
[brands.logos]
"FUJIFILM" = "logo/fuji_logo.jpg"
"NIKON CORPORATION" = "logo/nikon_logo.jpg"
"RICOH IMAGING COMPANY, LTD." = "logo/ricoh_logo.jpg"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Preset;
    use tempfile::TempDir;

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        for section in ["layout", "annotation", "brands", "processing"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }

    #[test]
    fn default_config_is_valid() {
        FramemarkConfig::default().validate().unwrap();
    }

    #[test]
    fn default_layout_matches_classic_preset() {
        assert_eq!(LayoutConfig::default().policy(), Preset::Classic.policy());
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(Some(value)).unwrap();
        assert_eq!(config, FramemarkConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let overlay: toml::Value = toml::from_str(
            r#"
            [layout]
            border_thickness = 0
            border_mode = "long-edge-only"
            "#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.layout.border_thickness, 0);
        assert_eq!(config.layout.border_mode, BorderMode::LongEdgeOnly);
        assert_eq!(config.layout.target_long_edge, 3000);
        assert_eq!(config.annotation, AnnotationConfig::default());
    }

    #[test]
    fn substitutions_array_replaces_stock_list() {
        let overlay: toml::Value = toml::from_str(
            r#"
            [[brands.substitutions]]
            pattern = "Canon Canon"
            replacement = "Canon"
            "#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(
            config.brands.substitutions,
            vec![Substitution::new("Canon Canon", "Canon")]
        );
    }

    #[test]
    fn logos_merge_with_stock_table() {
        let overlay: toml::Value = toml::from_str(
            r#"
            [brands.logos]
            "Canon" = "logo/canon.png"
            "#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.brands.logo_for("Canon"), Some("logo/canon.png"));
        assert_eq!(config.brands.logo_for("FUJIFILM"), Some("logo/fuji_logo.jpg"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let overlay: toml::Value = toml::from_str("[layout]\nborder = 3\n").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn zero_aspect_component_fails_validation() {
        let overlay: toml::Value = toml::from_str("[layout]\naspect_ratio = [3, 0]\n").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn zero_logo_height_fails_validation() {
        let mut config = FramemarkConfig::default();
        config.annotation.logo_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, FramemarkConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[annotation]\nplaceholder = \"n/a\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.annotation.placeholder, "n/a");
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[layout\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn aperture_allow_list_is_case_insensitive() {
        let brands = BrandsConfig::default();
        assert!(brands.allows_fixed_lens_aperture("gr iii"));
        assert!(!brands.allows_fixed_lens_aperture("X100V"));
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = effective_threads(&ProcessingConfig::default());
        assert!(cores >= 1);
        let capped = effective_threads(&ProcessingConfig {
            max_processes: Some(usize::MAX),
        });
        assert_eq!(capped, cores);
        let one = effective_threads(&ProcessingConfig {
            max_processes: Some(0),
        });
        assert_eq!(one, 1);
    }
}
