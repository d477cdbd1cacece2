#[cfg(test)]
mod tests {
    use std::{cell::Cell, path::Path};

    use burn::{backend::NdArray, tensor::Tensor};
    use serde_pickle::DeOptions;

    use crate::{
        evaluate_model,
        report::{PR_PICKLE_FILE, PR_PLOT_FILE}, ClassificationScores, EvalError, EvalResult,
        EvaluationConfig, LabelPatch, OutputFormat, PatchPosition, PatchResult,
        PrecisionRecallCurve, ResultVisualiser, StackedMatrixForm,
    };

    type TestBackend = NdArray<f32>;

    /// Counts results instead of drawing them.
    #[derive(Default)]
    struct CountingVisualiser {
        results: Cell<usize>,
    }

    impl ResultVisualiser<TestBackend> for CountingVisualiser {
        fn visualise(
            &self,
            results: &[PatchResult<TestBackend>],
            _patch_size: usize,
            _out_path: &Path,
            _out_format: OutputFormat,
        ) -> EvalResult<()> {
            self.results.set(results.len());
            Ok(())
        }
    }

    /// The model used here returns channel 0 of its input as the probability,
    /// so the features double as the model's answers.
    fn identity_model(x: Tensor<TestBackend, 4>) -> Tensor<TestBackend, 4> {
        x
    }

    fn test_set() -> (Vec<Tensor<TestBackend, 3>>, Vec<LabelPatch<TestBackend>>) {
        let device = Default::default();
        let features = vec![
            Tensor::from_floats([[[0.9], [0.2]], [[0.5], [0.7]]], &device),
            Tensor::from_floats([[[0.1], [0.6]], [[0.3], [0.4]]], &device),
        ];
        let labels = vec![
            LabelPatch::new(
                Tensor::from_floats([[[1.0], [0.0]], [[1.0], [0.0]]], &device),
                PatchPosition::new(0, 0),
                "tiles/a.tif",
            ),
            LabelPatch::new(
                Tensor::from_floats([[[0.0], [1.0]], [[0.0], [0.0]]], &device),
                PatchPosition::new(2, 0),
                "tiles/a.tif",
            ),
        ];
        (features, labels)
    }

    #[test]
    fn test_end_to_end_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let (features, labels) = test_set();
        let visualiser = CountingVisualiser::default();
        let config = EvaluationConfig::new(2);

        let evaluation = evaluate_model(
            &identity_model,
            &StackedMatrixForm,
            &visualiser,
            &features,
            &labels,
            &config,
            dir.path(),
        )
        .unwrap();

        // Bitmap: [1, 0, 1, 1] and [0, 1, 0, 0] against labels [1, 0, 1, 0] and [0, 1, 0, 0].
        assert_eq!(
            evaluation.scores,
            ClassificationScores {
                accuracy: 7.0 / 8.0,
                precision: 3.0 / 4.0,
                recall: 1.0,
                true_positives: 3,
                false_positives: 1,
                true_negatives: 4,
                false_negatives: 0,
            }
        );
        assert_eq!(evaluation.visualised, labels.len());
        assert_eq!(visualiser.results.get(), labels.len());

        // Eight distinct scores give eight thresholds.
        assert_eq!(evaluation.curve.thresholds.len(), 8);
        assert!(evaluation.report.pickle.ends_with(PR_PICKLE_FILE));

        let pickled: PrecisionRecallCurve = serde_pickle::from_reader(
            std::fs::File::open(&evaluation.report.pickle).unwrap(),
            DeOptions::new(),
        )
        .unwrap();
        assert_eq!(pickled, evaluation.curve);

        assert_eq!(evaluation.report.plot, Some(dir.path().join(PR_PLOT_FILE)));
        assert!(dir.path().join(PR_PLOT_FILE).exists());

        let metrics_json = evaluation.metrics_json.unwrap();
        let scores: ClassificationScores =
            serde_json::from_reader(std::fs::File::open(metrics_json).unwrap()).unwrap();
        assert_eq!(scores, evaluation.scores);
    }

    #[test]
    fn test_empty_test_set_fails_fast() {
        let dir = tempfile::tempdir().unwrap();

        let result = evaluate_model(
            &identity_model,
            &StackedMatrixForm,
            &CountingVisualiser::default(),
            &[],
            &[],
            &EvaluationConfig::new(2),
            dir.path(),
        );

        assert!(matches!(result, Err(EvalError::EmptyTestSet)));
        assert!(!dir.path().join(PR_PICKLE_FILE).exists());
    }

    #[test]
    fn test_model_output_shape_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let (features, labels) = test_set();
        let shrinking_model =
            |x: Tensor<TestBackend, 4>| x.slice([0..1, 0..2, 0..2, 0..1]);

        match evaluate_model(
            &shrinking_model,
            &StackedMatrixForm,
            &CountingVisualiser::default(),
            &features,
            &labels,
            &EvaluationConfig::new(2),
            dir.path(),
        ) {
            Err(EvalError::InvalidTensorShape { what, .. }) => assert_eq!(what, "model output"),
            other => panic!("Expected InvalidTensorShape error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_output_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (features, labels) = test_set();

        let result = evaluate_model(
            &identity_model,
            &StackedMatrixForm,
            &CountingVisualiser::default(),
            &features,
            &labels,
            &EvaluationConfig::new(2).with_write_metrics_json(false),
            &dir.path().join("does-not-exist"),
        );

        assert!(matches!(result, Err(EvalError::Io { .. })));
    }
}
