//! Segmentation Evaluation
//!
//! Scores saved probability maps against labelled patches and writes the
//! precision-recall curve, a metrics summary and overlay images.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate with defaults (256px patches, GeoTIFF overlays)
//! cargo run --bin evaluate -- manifest.json --output results/
//!
//! # Smaller patches and PNG overlays
//! cargo run --bin evaluate -- manifest.json --patch-size 64 --format PNG
//!
//! # Settings from a JSON file, with command line overrides on top
//! cargo run --bin evaluate -- manifest.json --config eval.json --threshold 0.4
//! ```

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use segeval::{evaluate_model, OutputFormat, OverlayVisualiser, StackedMatrixForm};
use segeval_tools::{
    backend_name, create_device, init_logging, EvalBackend, EvaluateConfig, Manifest,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the test-set manifest (JSON)
    manifest: PathBuf,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Edge length of the square patches
    #[arg(long)]
    patch_size: Option<usize>,

    /// Probability cutoff for positive pixels (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Overlay format (GeoTIFF or PNG)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Skip writing metrics.json
    #[arg(long)]
    no_metrics_json: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging()?;
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        serde_json::from_str::<EvaluateConfig>(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?
    } else {
        EvaluateConfig::default()
    };

    // Apply command line overrides
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(patch_size) = args.patch_size {
        config.patch_size = patch_size;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(format) = args.format {
        config.out_format = format;
    }
    if args.no_metrics_json {
        config.write_metrics_json = false;
    }

    if !(0.0..=1.0).contains(&config.threshold) {
        anyhow::bail!("Threshold must be within [0, 1], got {}", config.threshold);
    }
    if config.patch_size == 0 {
        anyhow::bail!("Patch size must be positive");
    }

    fs::create_dir_all(&config.output_path).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_path.display()
        )
    })?;

    let device = create_device();
    tracing::info!(backend = backend_name(), "using backend");

    let manifest = Manifest::load(&args.manifest)?;
    let test_set = manifest.load_test_set::<EvalBackend>(config.patch_size, &device)?;

    let start_time = Instant::now();
    let evaluation = evaluate_model(
        &test_set.model,
        &StackedMatrixForm,
        &OverlayVisualiser,
        &test_set.features,
        &test_set.labels,
        &config.evaluation(),
        &config.output_path,
    )
    .context("Evaluation failed")?;

    tracing::info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        curve_points = evaluation.curve.len(),
        pickle = %evaluation.report.pickle.display(),
        plotted = evaluation.report.plot.is_some(),
        "evaluation finished",
    );
    Ok(())
}
