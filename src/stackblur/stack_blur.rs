// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use crate::image::BlurImageMut;
use crate::parallel_for::RangeRunner;
use crate::stackblur::division_table::DIVISION_TABLE;
use crate::stackblur::kernel::{StackBlurKernel, WindowFill};
use crate::stackblur::line_view::LineSet;
use crate::stackblur::sliding_window::SlidingWindow;
use crate::stackblur::stack_blur_pass::{blur_lines, LinesProcessor};
use crate::unsafe_slice::UnsafeSlice;
use crate::{BlurError, MAX_RADIUS};

/// Separable stack blur with a kernel tier chosen once up front.
#[derive(Copy, Clone)]
pub struct StackBlur {
    kernel: StackBlurKernel,
    fill: WindowFill,
    processor: LinesProcessor,
}

impl std::fmt::Debug for StackBlur {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackBlur")
            .field("kernel", &self.kernel)
            .field("fill", &self.fill)
            .finish()
    }
}

impl StackBlur {
    /// Fails with [BlurError::UnsupportedKernel] when the build or the CPU
    /// cannot run `kernel`.
    pub fn new(kernel: StackBlurKernel) -> Result<StackBlur, BlurError> {
        let fill = kernel.default_fill();
        let processor = kernel
            .processor(fill)
            .ok_or(BlurError::UnsupportedKernel)?;
        log::debug!("Stack blur kernel selected: {kernel}, {fill:?}");
        Ok(StackBlur {
            kernel,
            fill,
            processor,
        })
    }

    /// Fastest kernel the running CPU supports.
    pub fn detect() -> StackBlur {
        StackBlur::new(StackBlurKernel::detect()).unwrap_or(StackBlur::reference())
    }

    fn reference() -> StackBlur {
        StackBlur {
            kernel: StackBlurKernel::Reference,
            fill: WindowFill::Sequential,
            processor: blur_lines::<SlidingWindow, false>,
        }
    }

    pub fn with_window_fill(self, fill: WindowFill) -> StackBlur {
        match self.kernel.processor(fill) {
            Some(processor) => StackBlur {
                fill,
                processor,
                ..self
            },
            None => self,
        }
    }

    pub fn kernel(&self) -> StackBlurKernel {
        self.kernel
    }

    pub fn window_fill(&self) -> WindowFill {
        self.fill
    }

    /// Blurs the image in place, rows first and then columns.
    ///
    /// Radius below 1 leaves the image untouched, radius above [MAX_RADIUS]
    /// is clamped. `thread_override` sets the number of partitions for this
    /// call only, 0 uses the runner's thread count.
    pub fn blur(
        &self,
        image: &mut BlurImageMut,
        radius: i32,
        runner: &impl RangeRunner,
        thread_override: usize,
    ) -> Result<(), BlurError> {
        image.check_layout()?;
        if radius < 1 {
            return Ok(());
        }
        let radius = (radius as usize).min(MAX_RADIUS);
        let divisor = &DIVISION_TABLE[radius];

        let width = image.width as usize;
        let height = image.height as usize;
        let stride = image.row_stride() as usize;
        let processor = self.processor;
        let pixels = UnsafeSlice::new(image.data.borrow_mut());

        for lines in [
            LineSet::rows(width, height, stride),
            LineSet::columns(width, height, stride),
        ] {
            runner.run_and_wait(
                0,
                lines.count(),
                &|begin: usize, end: usize| unsafe {
                    processor(pixels, &lines, begin, end, radius, divisor);
                },
                thread_override,
            );
        }
        Ok(())
    }
}

/// Blurs `image` in place with the fastest supported kernel.
///
/// # Arguments
///
/// * `image`: RGBA image, any channel order, blurred in place.
/// * `radius`: values below 1 are a no-op, values above 254 are clamped.
/// * `runner`: [crate::ParallelFor] or a rayon pool doing the partitioned work.
/// * `thread_override`: partitions per pass for this call, 0 uses the runner's thread count.
pub fn stack_blur(
    image: &mut BlurImageMut,
    radius: i32,
    runner: &impl RangeRunner,
    thread_override: usize,
) -> Result<(), BlurError> {
    StackBlur::detect().blur(image, radius, runner, thread_override)
}
