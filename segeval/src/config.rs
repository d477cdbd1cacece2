//! Evaluation configuration.
//!
//! `EvaluationConfig` follows Burn's `Config` pattern: required fields go through
//! `new`, optional ones have defaults and `with_*` setters, and the whole struct
//! can be saved to or loaded from JSON.

use std::{fmt, str::FromStr};

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Threshold at which a probability counts as a positive pixel.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Output format handed to the result visualiser.
///
/// The tags match the raster driver names used by GIS tooling; parsing is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Tagged image file. The default.
    #[default]
    #[serde(rename = "GeoTIFF")]
    GeoTiff,
    /// Portable network graphics.
    #[serde(rename = "PNG")]
    Png,
}

impl OutputFormat {
    /// File extension used for visualisation files of this format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::GeoTiff => "tif",
            Self::Png => "png",
        }
    }

    /// The tag this format is known by.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::GeoTiff => "GeoTIFF",
            Self::Png => "PNG",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for OutputFormat {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geotiff" | "gtiff" | "tiff" | "tif" => Ok(Self::GeoTiff),
            "png" => Ok(Self::Png),
            _ => Err(EvalError::UnsupportedFormat {
                format: s.to_owned(),
            }),
        }
    }
}

/// Settings for a single evaluation run.
#[derive(Config, Debug)]
pub struct EvaluationConfig {
    /// Edge length of the square patches the model consumes and produces.
    pub patch_size: usize,
    /// Probabilities at or above this value become positive pixels.
    #[config(default = 0.5)]
    pub threshold: f32,
    /// Format of the visualisation files.
    #[config(default = "OutputFormat::GeoTiff")]
    pub out_format: OutputFormat,
    /// Also write `metrics.json` next to the precision-recall artifacts.
    #[config(default = true)]
    pub write_metrics_json: bool,
}
