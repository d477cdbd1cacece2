//! Command-line tooling around `segeval`.
//!
//! ## Available binaries
//!
//! - `evaluate`: score saved probability maps against labelled patches
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin evaluate -- manifest.json --output results/
//!
//! # Plain PNG overlays instead of TIFF
//! cargo run --bin evaluate -- manifest.json --output results/ --format PNG
//! ```

pub mod common;
pub mod config;
pub mod manifest;

pub use common::{backend_name, create_device, init_logging, EvalBackend, EvalDevice};
pub use config::EvaluateConfig;
pub use manifest::{Manifest, ManifestEntry, PrecomputedModel, TestSet};
