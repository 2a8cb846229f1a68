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
use crate::image::PIXEL_SIZE;
use crate::parallel_for::RangeRunner;
use crate::{stack_blur, BlurError, BlurImageMut, MismatchedSize};
use image::{DynamicImage, RgbaImage};

/// Performs stack blur on the image
///
/// Images that are not RGBA8 are converted to RGBA8 first, so the result is
/// always [DynamicImage::ImageRgba8].
///
/// # Arguments
///
/// * `image`: Dynamic image provided by image crate
/// * `radius`: values below 1 return the converted image unchanged, values above 254 are clamped
/// * `runner`: pool doing the partitioned work
/// * `thread_override`: partitions per pass for this call, 0 uses the runner's thread count
///
pub fn stack_blur_image(
    image: DynamicImage,
    radius: i32,
    runner: &impl RangeRunner,
    thread_override: usize,
) -> Result<DynamicImage, BlurError> {
    let rgba = match image {
        DynamicImage::ImageRgba8(rgba) => rgba,
        other => other.to_rgba8(),
    };
    let (width, height) = rgba.dimensions();
    let mut raw = rgba.into_raw();
    let mut blur_image = BlurImageMut::borrow(&mut raw, width, height);
    stack_blur(&mut blur_image, radius, runner, thread_override)?;

    let received = raw.len();
    let blurred = RgbaImage::from_raw(width, height, raw).ok_or(
        BlurError::MinimumSliceSizeMismatch(MismatchedSize {
            expected: width as usize * height as usize * PIXEL_SIZE,
            received,
        }),
    )?;
    Ok(DynamicImage::ImageRgba8(blurred))
}
