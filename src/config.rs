//! Export configuration
//!
//! Options can be built in code, parsed from CLI flags (`FromStr`) or read
//! from a TOML file:
//!
//! ```toml
//! chart_theme = "forest"
//! math_mode = "image"
//! max_image_width_px = 480
//! render_timeout_ms = 5000
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::error::{ExportError, ExportResult};

/// Theme handed to the diagram renderer on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTheme {
    #[default]
    Default,
    Neutral,
    Forest,
    Base,
}

impl ChartTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartTheme::Default => "default",
            ChartTheme::Neutral => "neutral",
            ChartTheme::Forest => "forest",
            ChartTheme::Base => "base",
        }
    }
}

impl fmt::Display for ChartTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartTheme {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(ChartTheme::Default),
            "neutral" => Ok(ChartTheme::Neutral),
            "forest" => Ok(ChartTheme::Forest),
            "base" => Ok(ChartTheme::Base),
            other => Err(ExportError::config(format!(
                "unknown chart theme '{}' (expected default, neutral, forest or base)",
                other
            ))),
        }
    }
}

/// How math is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathMode {
    /// Structured OMML.
    #[default]
    Native,
    /// Rasterized images, falling back to native on failure.
    Image,
}

impl fmt::Display for MathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MathMode::Native => "native",
            MathMode::Image => "image",
        })
    }
}

impl FromStr for MathMode {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(MathMode::Native),
            "image" => Ok(MathMode::Image),
            other => Err(ExportError::config(format!(
                "unknown math mode '{}' (expected native or image)",
                other
            ))),
        }
    }
}

pub const DEFAULT_MAX_IMAGE_WIDTH_PX: u32 = 600;
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    pub chart_theme: ChartTheme,
    pub math_mode: MathMode,
    /// Widest display size for embedded images; taller images keep
    /// their aspect ratio.
    pub max_image_width_px: u32,
    /// Upper bound for each external rasterization call.
    pub render_timeout_ms: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            chart_theme: ChartTheme::Default,
            math_mode: MathMode::Native,
            max_image_width_px: DEFAULT_MAX_IMAGE_WIDTH_PX,
            render_timeout_ms: DEFAULT_RENDER_TIMEOUT_MS,
        }
    }
}

impl ExportOptions {
    pub fn from_toml_str(source: &str) -> ExportResult<Self> {
        let options: ExportOptions = toml::from_str(source)?;
        if options.max_image_width_px == 0 {
            return Err(ExportError::config("max_image_width_px must be positive"));
        }
        Ok(options)
    }

    pub fn load(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ExportError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.chart_theme, ChartTheme::Default);
        assert_eq!(options.math_mode, MathMode::Native);
        assert_eq!(options.max_image_width_px, 600);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = ExportOptions::from_toml_str("math_mode = \"image\"\nchart_theme = \"forest\"")
            .expect("valid config");
        assert_eq!(
            options,
            ExportOptions {
                chart_theme: ChartTheme::Forest,
                math_mode: MathMode::Image,
                ..ExportOptions::default()
            }
        );
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(ExportOptions::from_toml_str("math_mode = \"mathml\"").is_err());
        assert!(ExportOptions::from_toml_str("unknown_key = 1").is_err());
        assert!(ExportOptions::from_toml_str("max_image_width_px = 0").is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Neutral".parse::<ChartTheme>().ok(), Some(ChartTheme::Neutral));
        assert_eq!(" image ".parse::<MathMode>().ok(), Some(MathMode::Image));
        assert!("dark".parse::<ChartTheme>().is_err());
        assert_eq!(ChartTheme::Base.to_string(), "base");
    }
}
