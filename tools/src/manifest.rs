//! Test sets described by a JSON manifest.
//!
//! Each entry names a feature image, a label mask, the saved probability map
//! the model produced for that feature, and where the patch sits in its
//! source image:
//!
//! ```json
//! {
//!   "samples": [
//!     {
//!       "feature": "features/0001.png",
//!       "label": "labels/0001.png",
//!       "prediction": "predictions/0001.png",
//!       "position": { "x": 0, "y": 256 },
//!       "source": "scenes/tile_a.tif"
//!     }
//!   ]
//! }
//! ```
//!
//! Relative paths are resolved against the manifest's directory. Entries keep
//! their order, which is what pairs features with labels.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use burn::tensor::{backend::Backend, Tensor};
use segeval::{LabelPatch, PatchPosition, SegmentationModel};
use serde::{Deserialize, Serialize};

use crate::common::image::{load_binary_mask, load_mask};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub feature: PathBuf,
    pub label: PathBuf,
    pub prediction: PathBuf,
    #[serde(default)]
    pub position: PatchPosition,
    pub source: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub samples: Vec<ManifestEntry>,
    #[serde(skip)]
    root: PathBuf,
}

/// Features, labels and saved predictions, all in manifest order.
#[derive(Debug, Clone)]
pub struct TestSet<B: Backend> {
    pub features: Vec<Tensor<B, 3>>,
    pub labels: Vec<LabelPatch<B>>,
    pub model: PrecomputedModel<B>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let mut manifest: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
        manifest.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Loads every image the manifest names.
    ///
    /// Sources are kept as written, since they identify the scene rather than
    /// a file this tool reads.
    pub fn load_test_set<B: Backend>(
        &self,
        patch_size: usize,
        device: &B::Device,
    ) -> Result<TestSet<B>> {
        ensure!(!self.samples.is_empty(), "Manifest lists no samples");

        let mut features = Vec::with_capacity(self.samples.len());
        let mut labels = Vec::with_capacity(self.samples.len());
        let mut predictions = Vec::with_capacity(self.samples.len());

        for entry in &self.samples {
            features.push(load_mask::<B, _>(
                self.resolve(&entry.feature),
                Some(patch_size),
                device,
            )?);
            labels.push(LabelPatch::new(
                load_binary_mask::<B, _>(self.resolve(&entry.label), Some(patch_size), device)?,
                entry.position,
                entry.source.clone(),
            ));
            predictions.push(load_mask::<B, _>(
                self.resolve(&entry.prediction),
                Some(patch_size),
                device,
            )?);
        }

        tracing::info!(samples = labels.len(), "loaded test set");
        Ok(TestSet {
            features,
            labels,
            model: PrecomputedModel::new(Tensor::stack(predictions, 0)),
        })
    }
}

/// A model whose output was computed ahead of time.
///
/// `predict` ignores its input values and returns the stored probabilities,
/// which must line up with the input batch.
#[derive(Debug, Clone)]
pub struct PrecomputedModel<B: Backend> {
    probabilities: Tensor<B, 4>,
}

impl<B: Backend> PrecomputedModel<B> {
    pub fn new(probabilities: Tensor<B, 4>) -> Self {
        Self { probabilities }
    }
}

impl<B: Backend> SegmentationModel<B> for PrecomputedModel<B> {
    fn predict(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [samples, ..] = x.dims();
        let [stored, ..] = self.probabilities.dims();
        if samples != stored {
            tracing::warn!(samples, stored, "batch size differs from stored predictions");
        }
        self.probabilities.clone()
    }
}
