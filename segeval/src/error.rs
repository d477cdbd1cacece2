use std::path::PathBuf;

use thiserror::Error;

/// The error type for `segeval` operations.
///
/// Shape problems are reported here instead of surfacing as tensor panics, so a
/// caller gets a readable message when features, labels and model output disagree.
#[derive(Error, Debug)]
pub enum EvalError {
    /// The test set contains no samples.
    #[error("Cannot evaluate an empty test set")]
    EmptyTestSet,

    /// Features and labels are paired by position, so their counts must agree.
    #[error("Feature/label count mismatch: {features} features, {labels} labels")]
    LengthMismatch {
        /// Number of feature patches.
        features: usize,
        /// Number of label patches.
        labels: usize,
    },

    /// Error for when a tensor has an unexpected shape.
    #[error("Invalid tensor shape for {what}: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// Which tensor was being checked.
        what: &'static str,
        /// The expected shape.
        expected: String,
        /// The actual shape.
        actual: String,
    },

    /// A value other than 0 or 1 was found where a binary array was required.
    #[error("Expected binary values in {what}, found {count} non-binary elements")]
    NonBinaryValues {
        /// Which array was being checked.
        what: &'static str,
        /// Number of offending elements.
        count: usize,
    },

    /// Reading tensor data back to the host failed.
    #[error("Tensor data conversion failed: {reason}")]
    TensorData {
        /// Description of the failure.
        reason: String,
    },

    /// An output format tag that no visualiser understands.
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat {
        /// The rejected tag.
        format: String,
    },

    /// Filesystem failure with the path that caused it.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the precision-recall pickle failed.
    #[error("Pickle serialization failed: {0}")]
    Pickle(#[from] serde_pickle::Error),

    /// Writing the JSON metrics report failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoding a visualisation image failed.
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// A visualiser reported a failure of its own.
    #[error("Visualisation failed: {message}")]
    Visualisation {
        /// The error message.
        message: String,
    },
}

impl EvalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn shape(what: &'static str, expected: impl ToString, actual: impl ToString) -> Self {
        Self::InvalidTensorShape {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// A specialized `Result` type for `segeval` operations.
pub type EvalResult<T> = Result<T, EvalError>;
