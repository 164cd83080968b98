pub(crate) mod cpu;

use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::imaging::buffer::ImageBuffer;

/// Per-pixel transform that any [`ComputeBackend`] can run.
///
/// `apply` receives one pixel's channels in place. Kernels must not depend on evaluation
/// order so a backend is free to parallelise or offload them.
pub trait PixelKernel: Sync {
    /// Short name used in diagnostics.
    fn label(&self) -> &str;

    /// Colorspace tag of the result, when the kernel changes it.
    fn output_colorspace(&self) -> Option<&str> {
        None
    }

    /// Transform the pixel at `(x, y)`.
    fn apply(&self, x: u32, y: u32, px: &mut [f32]);
}

/// Execution target for pixel kernels.
///
/// A failed dispatch surfaces through the dispatching node's last error, like any other
/// processing failure.
pub trait ComputeBackend {
    /// Backend name for logs and reports.
    fn name(&self) -> &str;

    /// Run `kernel` over every pixel of `image`, returning a new buffer.
    fn dispatch(
        &mut self,
        kernel: &dyn PixelKernel,
        image: &ImageBuffer,
    ) -> ArtificeResult<ImageBuffer>;
}

/// Available backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Reference CPU implementation.
    #[default]
    Cpu,
}

impl std::str::FromStr for BackendKind {
    type Err = ArtificeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(BackendKind::Cpu),
            other => Err(ArtificeError::processing(format!(
                "requested backend '{other}' is not available"
            ))),
        }
    }
}

/// Construct a backend by kind.
pub fn create_backend(kind: BackendKind, opts: &cpu::CpuBackendOpts) -> Box<dyn ComputeBackend> {
    match kind {
        BackendKind::Cpu => Box::new(cpu::CpuBackend::new(opts.clone())),
    }
}
