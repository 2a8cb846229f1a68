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
//! Multithreaded stack blur for 8-bit RGBA images.
//!
//! The blur runs a sliding triangular window along every row and then along
//! every column, with a fixed-point multiply-shift in place of per-pixel
//! division. Several kernel tiers (scalar reference, portable, SSE2, SSE4.1,
//! NEON) produce byte-identical results.
//!
//! ```no_run
//! use bigblur::{stack_blur, BlurImageMut, ParallelFor, ThreadingPolicy};
//!
//! let pool = ParallelFor::new(ThreadingPolicy::Adaptive).unwrap();
//! let mut image = BlurImageMut::alloc(640, 480);
//! stack_blur(&mut image, 25, &pool, 0).unwrap();
//! ```
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod gaussian_blur;
mod image;
mod parallel_for;
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
mod stack_blur_image;
mod stackblur;
mod threading_policy;
mod unsafe_slice;
mod util;
mod weights;

pub use gaussian_blur::gaussian_blur;
pub use image::{BlurImageMut, BufferStore, PIXEL_SIZE};
pub use parallel_for::{split_range, ParallelFor, RangeChunks, RangeRunner};
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
pub use stack_blur_image::stack_blur_image;
pub use stackblur::{
    stack_blur, Divisor, StackBlur, StackBlurKernel, WindowFill, DIVISION_TABLE,
};
pub use threading_policy::ThreadingPolicy;
pub use util::{BlurError, MismatchedSize};
pub use weights::{gaussian_kernel, triangular_kernel, DEFAULT_SIGMA_COEFFICIENT};

/// Largest radius the blur accepts, bigger values are clamped to it.
pub const MAX_RADIUS: usize = 254;
