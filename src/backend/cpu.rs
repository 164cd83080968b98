use crate::backend::{ComputeBackend, PixelKernel};
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::imaging::buffer::ImageBuffer;

/// Options for [`CpuBackend`].
#[derive(Clone, Debug)]
pub struct CpuBackendOpts {
    /// Largest accepted image, in pixels. Larger dispatches fail instead of allocating.
    pub max_pixels: u64,
}

impl Default for CpuBackendOpts {
    fn default() -> Self {
        Self {
            max_pixels: 1 << 28,
        }
    }
}

/// Single-threaded reference backend.
#[derive(Debug, Default)]
pub struct CpuBackend {
    opts: CpuBackendOpts,
    dispatches: u64,
}

impl CpuBackend {
    /// Build a backend with `opts`.
    pub fn new(opts: CpuBackendOpts) -> Self {
        Self {
            opts,
            dispatches: 0,
        }
    }

    /// Number of successful dispatches so far.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    #[tracing::instrument(skip_all, fields(kernel = kernel.label()))]
    fn dispatch(
        &mut self,
        kernel: &dyn PixelKernel,
        image: &ImageBuffer,
    ) -> ArtificeResult<ImageBuffer> {
        let pixels = u64::from(image.width()) * u64::from(image.height());
        if pixels > self.opts.max_pixels {
            return Err(ArtificeError::processing(format!(
                "{}x{} image exceeds the cpu backend limit of {} pixels",
                image.width(),
                image.height(),
                self.opts.max_pixels
            )));
        }

        let channels = usize::from(image.channels());
        let stride = image.width() as usize * channels;
        let mut out = image.clone();
        for (y, row) in out.samples_mut().chunks_exact_mut(stride).enumerate() {
            for (x, px) in row.chunks_exact_mut(channels).enumerate() {
                kernel.apply(x as u32, y as u32, px);
            }
        }
        if let Some(space) = kernel.output_colorspace() {
            out = out.with_colorspace(space);
        }
        self.dispatches += 1;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/cpu.rs"]
mod tests;
