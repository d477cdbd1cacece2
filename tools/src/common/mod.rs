//! Shared setup for the command-line tools.
//!
//! Backend selection is driven by cargo features; `ndarray` is the default.

pub mod image;

use burn::tensor::backend::Backend;
use cfg_if::cfg_if;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

cfg_if! {
    if #[cfg(feature = "cuda")] {
        /// Backend the evaluation tool runs the model and metrics on.
        pub type EvalBackend = burn::backend::Cuda;
        const BACKEND_NAME: &str = "CUDA (NVIDIA GPU)";
    } else if #[cfg(feature = "wgpu")] {
        /// Backend the evaluation tool runs the model and metrics on.
        pub type EvalBackend = burn::backend::Wgpu;
        const BACKEND_NAME: &str = "WGPU (GPU)";
    } else {
        /// Backend the evaluation tool runs the model and metrics on.
        pub type EvalBackend = burn::backend::NdArray;
        const BACKEND_NAME: &str = "NdArray (CPU)";
    }
}

pub type EvalDevice = <EvalBackend as Backend>::Device;

/// Default device of [`EvalBackend`]; test patches are loaded onto it.
pub fn create_device() -> EvalDevice {
    EvalDevice::default()
}

/// Human-readable backend, logged once at startup.
pub const fn backend_name() -> &'static str {
    BACKEND_NAME
}

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Stdout is left to the metric lines the evaluation prints.
pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to initialize tracing: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Tensor;

    #[test]
    fn test_patches_load_onto_the_created_device() {
        let device = create_device();
        let patch = Tensor::<EvalBackend, 3>::zeros([2, 2, 1], &device);

        assert_eq!(patch.device(), device);
    }

    #[cfg(not(any(feature = "cuda", feature = "wgpu")))]
    #[test]
    fn test_default_backend_is_cpu() {
        assert_eq!(backend_name(), "NdArray (CPU)");
    }
}
