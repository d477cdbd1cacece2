//! Regrouping of per-pixel results into per-patch results for rendering.
//!
//! The model output carries no notion of where a patch came from. That
//! information lives in the labels, so the adapter pairs the i-th prediction
//! with the i-th label.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Component, Path, PathBuf},
};

use burn::tensor::{backend::Backend, Tensor};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::{
    config::OutputFormat,
    dataset::{LabelPatch, PatchPosition},
    error::{EvalError, EvalResult},
    metrics::to_host_vec,
};

/// One test sample ready to be drawn.
#[derive(Debug, Clone)]
pub struct PatchResult<B: Backend> {
    /// Thresholded prediction, `[patch, patch, 1]`.
    pub prediction: Tensor<B, 3>,
    /// Ground truth, `[patch, patch, 1]`.
    pub label: Tensor<B, 3>,
    /// False-positive mask, `[patch, patch, 1]`.
    pub false_positives: Tensor<B, 3>,
    pub position: PatchPosition,
    pub source: PathBuf,
}

/// Renders evaluation results onto the source imagery.
pub trait ResultVisualiser<B: Backend> {
    fn visualise(
        &self,
        results: &[PatchResult<B>],
        patch_size: usize,
        out_path: &Path,
        out_format: OutputFormat,
    ) -> EvalResult<()>;
}

/// Splits predictions and false positives into per-sample patches and hands
/// them to `visualiser` together with the label metadata.
///
/// Both tensors must hold exactly `labels.len() * patch_size * patch_size`
/// elements. Returns the number of results produced.
pub fn visualise_predictions<B, V>(
    predictions: Tensor<B, 4>,
    labels: &[LabelPatch<B>],
    false_positives: Tensor<B, 4>,
    patch_size: usize,
    out_path: &Path,
    out_format: OutputFormat,
    visualiser: &V,
) -> EvalResult<usize>
where
    B: Backend,
    V: ResultVisualiser<B> + ?Sized,
{
    tracing::info!(format = %out_format, "creating result files");
    let results = regroup(predictions, labels, false_positives, patch_size)?;
    visualiser.visualise(&results, patch_size, out_path, out_format)?;
    Ok(results.len())
}

/// Reshapes to `[labels.len(), patch, patch, 1]` and zips with the labels.
pub fn regroup<B: Backend>(
    predictions: Tensor<B, 4>,
    labels: &[LabelPatch<B>],
    false_positives: Tensor<B, 4>,
    patch_size: usize,
) -> EvalResult<Vec<PatchResult<B>>> {
    let shape = [labels.len(), patch_size, patch_size, 1];
    let predictions = reshape_checked("predictions", predictions, shape)?;
    let false_positives = reshape_checked("false positives", false_positives, shape)?;

    let results = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let sample = [i..i + 1, 0..patch_size, 0..patch_size, 0..1];
            PatchResult {
                prediction: predictions.clone().slice(sample.clone()).squeeze(0),
                label: label.patch.clone(),
                false_positives: false_positives.clone().slice(sample).squeeze(0),
                position: label.position,
                source: label.source.clone(),
            }
        })
        .collect();

    Ok(results)
}

fn reshape_checked<B: Backend>(
    what: &'static str,
    tensor: Tensor<B, 4>,
    shape: [usize; 4],
) -> EvalResult<Tensor<B, 4>> {
    let dims = tensor.dims();
    if dims.iter().product::<usize>() != shape.iter().product::<usize>() {
        return Err(EvalError::shape(
            what,
            format!("{shape:?}"),
            format!("{dims:?}"),
        ));
    }
    Ok(tensor.reshape(shape))
}

const TRUE_POSITIVE: Rgba<u8> = Rgba([0, 200, 0, 255]);
const FALSE_POSITIVE: Rgba<u8> = Rgba([220, 0, 0, 255]);
const MISSED: Rgba<u8> = Rgba([0, 0, 220, 255]);

/// Writes one overlay image per source image.
///
/// Patches are painted at their positions: hits in green, false positives in
/// red, missed label pixels in blue. Everything else stays transparent. The
/// files carry no georeferencing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayVisualiser;

impl OverlayVisualiser {
    /// Output path for every source, keyed by source.
    ///
    /// A source is named after its file stem. Sources that share a stem are
    /// named after their whole path instead, so `north/scene.tif` becomes
    /// `north_scene_result.<ext>`.
    ///
    /// # Errors
    ///
    /// Fails when two sources still map to the same file.
    pub fn output_files<'a>(
        sources: impl IntoIterator<Item = &'a Path>,
        out_path: &Path,
        out_format: OutputFormat,
    ) -> EvalResult<BTreeMap<&'a Path, PathBuf>> {
        let sources: BTreeSet<&Path> = sources.into_iter().collect();
        let mut stems: BTreeMap<String, usize> = BTreeMap::new();
        for source in &sources {
            *stems.entry(file_stem(source)).or_default() += 1;
        }

        let mut files = BTreeMap::new();
        let mut taken = BTreeSet::new();
        for source in sources {
            let stem = file_stem(source);
            let name = if stems[&stem] > 1 {
                path_stem(source)
            } else {
                stem
            };
            let file = out_path.join(format!("{name}_result.{}", out_format.extension()));
            if !taken.insert(file.clone()) {
                return Err(EvalError::Visualisation {
                    message: format!(
                        "{} maps to {}, which another source already uses",
                        source.display(),
                        file.display()
                    ),
                });
            }
            files.insert(source, file);
        }

        Ok(files)
    }
}

fn file_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "patches".to_owned())
}

/// Every normal path component without the extension, joined by `_`.
fn path_stem(source: &Path) -> String {
    let parts: Vec<String> = source
        .with_extension("")
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        "patches".to_owned()
    } else {
        parts.join("_")
    }
}

/// `origin + by`, or an error when the pixel falls outside `u32` range.
fn shifted(origin: u32, by: usize, source: &Path) -> EvalResult<u32> {
    u32::try_from(by)
        .ok()
        .and_then(|by| origin.checked_add(by))
        .ok_or_else(|| EvalError::Visualisation {
            message: format!(
                "pixel {origin} + {by} of {} exceeds the image size limit",
                source.display()
            ),
        })
}

impl<B: Backend> ResultVisualiser<B> for OverlayVisualiser {
    fn visualise(
        &self,
        results: &[PatchResult<B>],
        patch_size: usize,
        out_path: &Path,
        out_format: OutputFormat,
    ) -> EvalResult<()> {
        let mut by_source: BTreeMap<&Path, Vec<&PatchResult<B>>> = BTreeMap::new();
        for result in results {
            by_source.entry(result.source.as_path()).or_default().push(result);
        }
        let files = Self::output_files(by_source.keys().copied(), out_path, out_format)?;

        let format = match out_format {
            OutputFormat::GeoTiff => ImageFormat::Tiff,
            OutputFormat::Png => ImageFormat::Png,
        };

        for (source, patches) in by_source {
            let (mut width, mut height) = (0, 0);
            for result in &patches {
                width = width.max(shifted(result.position.x, patch_size, source)?);
                height = height.max(shifted(result.position.y, patch_size, source)?);
            }
            let mut canvas = RgbaImage::new(width, height);

            for result in patches {
                let prediction = to_host_vec(result.prediction.clone())?;
                let label = to_host_vec(result.label.clone())?;
                let false_positive = to_host_vec(result.false_positives.clone())?;
                let pixels = patch_size * patch_size;
                if prediction.len() != pixels {
                    return Err(EvalError::shape(
                        "overlay patch",
                        format!("{pixels} pixels"),
                        format!("{} pixels", prediction.len()),
                    ));
                }

                for (i, ((&p, &l), &fp)) in prediction
                    .iter()
                    .zip(&label)
                    .zip(&false_positive)
                    .enumerate()
                {
                    let colour = if fp == 1.0 {
                        FALSE_POSITIVE
                    } else if p == 1.0 && l == 1.0 {
                        TRUE_POSITIVE
                    } else if l == 1.0 {
                        MISSED
                    } else {
                        continue;
                    };
                    let x = shifted(result.position.x, i % patch_size, source)?;
                    let y = shifted(result.position.y, i / patch_size, source)?;
                    canvas.put_pixel(x, y, colour);
                }
            }

            let file = &files[source];
            tracing::debug!(file = %file.display(), "writing overlay");
            canvas.save_with_format(file, format)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::cell::RefCell;

    type TestBackend = NdArray<f32>;

    /// Records what it was given instead of drawing.
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<(PatchPosition, PathBuf, Vec<f32>)>>,
    }

    impl ResultVisualiser<TestBackend> for Recorder {
        fn visualise(
            &self,
            results: &[PatchResult<TestBackend>],
            _patch_size: usize,
            _out_path: &Path,
            _out_format: OutputFormat,
        ) -> EvalResult<()> {
            for result in results {
                self.seen.borrow_mut().push((
                    result.position,
                    result.source.clone(),
                    to_host_vec(result.prediction.clone())?,
                ));
            }
            Ok(())
        }
    }

    fn labels(count: u32) -> Vec<LabelPatch<TestBackend>> {
        let device = Default::default();
        (0..count)
            .map(|i| {
                LabelPatch::new(
                    Tensor::zeros([2, 2, 1], &device),
                    PatchPosition::new(2 * i, 0),
                    format!("scene_{}.tif", i % 2),
                )
            })
            .collect()
    }

    #[test]
    fn test_one_result_per_label_in_order() {
        let device = Default::default();
        let labels = labels(3);
        // Flat layout, sample i filled with value i.
        let predictions = Tensor::<TestBackend, 1>::from_floats(
            [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0],
            &device,
        )
        .reshape([12, 1, 1, 1]);
        let false_positives = Tensor::<TestBackend, 4>::zeros([3, 2, 2, 1], &device);
        let recorder = Recorder::default();

        let count = visualise_predictions(
            predictions,
            &labels,
            false_positives,
            2,
            Path::new("unused"),
            OutputFormat::GeoTiff,
            &recorder,
        )
        .unwrap();

        assert_eq!(count, labels.len());
        let seen = recorder.seen.into_inner();
        assert_eq!(seen.len(), labels.len());
        for (i, (label, (position, source, prediction))) in labels.iter().zip(&seen).enumerate() {
            assert_eq!(*position, label.position);
            assert_eq!(source, &label.source);
            assert_eq!(prediction, &vec![i as f32; 4]);
        }
    }

    #[test]
    fn test_element_count_mismatch_is_an_error() {
        let device = Default::default();
        let predictions = Tensor::<TestBackend, 4>::zeros([2, 2, 2, 1], &device);
        let false_positives = Tensor::<TestBackend, 4>::zeros([3, 2, 2, 1], &device);

        match regroup(predictions, &labels(3), false_positives, 2) {
            Err(EvalError::InvalidTensorShape { what, .. }) => assert_eq!(what, "predictions"),
            other => panic!("Expected InvalidTensorShape error, got {other:?}"),
        }
    }

    #[test]
    fn test_overlay_writes_one_file_per_source() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let labels = labels(3);
        let predictions = Tensor::<TestBackend, 4>::ones([3, 2, 2, 1], &device);
        let false_positives = Tensor::<TestBackend, 4>::ones([3, 2, 2, 1], &device);

        visualise_predictions(
            predictions,
            &labels,
            false_positives,
            2,
            dir.path(),
            OutputFormat::Png,
            &OverlayVisualiser,
        )
        .unwrap();

        let scene_0 = image::open(dir.path().join("scene_0_result.png"))
            .unwrap()
            .to_rgba8();
        // Patches 0 and 2 land at x = 0 and x = 4.
        assert_eq!(scene_0.dimensions(), (6, 2));
        assert_eq!(*scene_0.get_pixel(0, 0), FALSE_POSITIVE);
        assert_eq!(scene_0.get_pixel(2, 0)[3], 0);
        assert!(dir.path().join("scene_1_result.png").exists());
    }

    fn overlay_of(labels: &[LabelPatch<TestBackend>], out_path: &Path) -> EvalResult<usize> {
        let device = Default::default();
        let shape = [labels.len(), 2, 2, 1];
        visualise_predictions(
            Tensor::<TestBackend, 4>::ones(shape, &device),
            labels,
            Tensor::<TestBackend, 4>::zeros(shape, &device),
            2,
            out_path,
            OutputFormat::Png,
            &OverlayVisualiser,
        )
    }

    #[test]
    fn test_same_stem_in_different_directories_keeps_both_overlays() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let labels: Vec<_> = [("north/scene.tif", 0), ("south/scene.tif", 4)]
            .into_iter()
            .map(|(source, x)| {
                LabelPatch::new(
                    Tensor::<TestBackend, 3>::ones([2, 2, 1], &device),
                    PatchPosition::new(x, 0),
                    source,
                )
            })
            .collect();

        overlay_of(&labels, dir.path()).unwrap();

        let north = image::open(dir.path().join("north_scene_result.png")).unwrap();
        let south = image::open(dir.path().join("south_scene_result.png")).unwrap();
        assert_eq!(north.to_rgba8().dimensions(), (2, 2));
        assert_eq!(south.to_rgba8().dimensions(), (6, 2));
        assert!(!dir.path().join("scene_result.png").exists());
    }

    #[test]
    fn test_output_files_keep_plain_stems_when_unique() {
        let sources = [Path::new("tiles/a.tif"), Path::new("tiles/b.tif")];

        let files =
            OverlayVisualiser::output_files(sources, Path::new("out"), OutputFormat::GeoTiff)
                .unwrap();

        assert_eq!(files[sources[0]], Path::new("out/a_result.tif"));
        assert_eq!(files[sources[1]], Path::new("out/b_result.tif"));
    }

    #[test]
    fn test_output_files_reject_names_that_still_clash() {
        let sources = [Path::new("tiles/scene.tif"), Path::new("tiles/scene.png")];

        match OverlayVisualiser::output_files(sources, Path::new("out"), OutputFormat::Png) {
            Err(EvalError::Visualisation { message }) => {
                assert!(message.contains("tiles_scene_result.png"))
            }
            other => panic!("Expected Visualisation error, got {other:?}"),
        }
    }

    #[test]
    fn test_position_near_u32_max_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let labels = vec![LabelPatch::new(
            Tensor::<TestBackend, 3>::ones([2, 2, 1], &device),
            PatchPosition::new(u32::MAX - 1, 0),
            "edge.tif",
        )];

        match overlay_of(&labels, dir.path()) {
            Err(EvalError::Visualisation { message }) => assert!(message.contains("edge.tif")),
            other => panic!("Expected Visualisation error, got {other:?}"),
        }
        assert!(!dir.path().join("edge_result.png").exists());
    }
}
