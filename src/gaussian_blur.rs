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
use crate::stackblur::line_view::{LineSet, LineView};
use crate::unsafe_slice::UnsafeSlice;
use crate::weights::{gaussian_kernel, DEFAULT_SIGMA_COEFFICIENT};
use crate::{BlurError, MAX_RADIUS};

fn convolve_line(line: &LineView, kernel: &[f32], buffer: &mut Vec<u32>) {
    let radius = (kernel.len() / 2) as isize;
    buffer.clear();
    for i in 0..line.len() as isize {
        let mut sums = [0f32; 4];
        for (k, &weight) in kernel.iter().enumerate() {
            let px = line.get(i + k as isize - radius).to_le_bytes();
            for (sum, c) in sums.iter_mut().zip(px) {
                *sum += c as f32 * weight;
            }
        }
        buffer.push(u32::from_le_bytes(
            sums.map(|v| v.round().clamp(0., 255.) as u8),
        ));
    }
    for (i, &px) in buffer.iter().enumerate() {
        line.set(i as isize, px);
    }
}

/// Two-pass gaussian blur computed directly from the kernel weights.
///
/// Serves as a quality and speed baseline for [crate::stack_blur]: every
/// output pixel costs `2 * radius + 1` reads per pass. Radius handling matches
/// the stack blur, sigma is `radius / 2.5`.
pub fn gaussian_blur(
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
    let kernel = gaussian_kernel::<f32>(radius, DEFAULT_SIGMA_COEFFICIENT);

    let width = image.width as usize;
    let height = image.height as usize;
    let stride = image.row_stride() as usize;
    let pixels = UnsafeSlice::new(image.data.borrow_mut());

    for lines in [
        LineSet::rows(width, height, stride),
        LineSet::columns(width, height, stride),
    ] {
        runner.run_and_wait(
            0,
            lines.count(),
            &|begin: usize, end: usize| {
                let mut buffer = Vec::new();
                for index in begin..end {
                    // Disjoint lines per chunk, layout checked above.
                    let line = unsafe { lines.line(pixels, index) };
                    convolve_line(&line, &kernel, &mut buffer);
                }
            },
            thread_override,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stack_blur, ParallelFor};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_uniform_image_is_unchanged() {
        let pool = ParallelFor::with_threads(2).unwrap();
        let mut image = BlurImageMut::alloc(9, 7);
        image.data.borrow_mut().fill(200);
        gaussian_blur(&mut image, 5, &pool, 0).unwrap();
        assert!(image.data.borrow().iter().all(|&b| b == 200));
    }

    #[test]
    fn test_non_positive_radius_is_noop() {
        let pool = ParallelFor::with_threads(2).unwrap();
        let mut image = BlurImageMut::alloc(6, 6);
        StdRng::seed_from_u64(1).fill(image.data.borrow_mut());
        let original = image.data.borrow().to_vec();
        gaussian_blur(&mut image, 0, &pool, 0).unwrap();
        gaussian_blur(&mut image, -3, &pool, 0).unwrap();
        assert_eq!(image.data.borrow(), original.as_slice());
    }

    #[test]
    fn test_close_to_stack_blur() {
        let pool = ParallelFor::with_threads(3).unwrap();
        let (width, height) = (40u32, 30u32);
        let mut gaussian = BlurImageMut::alloc(width, height);
        let mut rng = StdRng::seed_from_u64(11);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 255) / width) as u8;
                let noise: u8 = rng.random_range(0..8);
                gaussian.set_pixel(x, y, u32::from_le_bytes([v, v / 2, 255 - v, noise]));
            }
        }
        let mut stack = BlurImageMut::alloc(width, height);
        stack.data.borrow_mut().copy_from_slice(gaussian.data.borrow());

        gaussian_blur(&mut gaussian, 6, &pool, 0).unwrap();
        stack_blur(&mut stack, 6, &pool, 0).unwrap();

        let max_diff = gaussian
            .data
            .borrow()
            .iter()
            .zip(stack.data.borrow())
            .map(|(&a, &b)| a.abs_diff(b))
            .max()
            .unwrap_or(0);
        assert!(max_diff <= 12, "max difference {max_diff}");
    }

    #[test]
    fn test_rayon_matches_pool() {
        let pool = ParallelFor::with_threads(4).unwrap();
        let rayon_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap();
        let mut first = BlurImageMut::alloc(21, 13);
        StdRng::seed_from_u64(3).fill(first.data.borrow_mut());
        let mut second = BlurImageMut::alloc(21, 13);
        second.data.borrow_mut().copy_from_slice(first.data.borrow());
        gaussian_blur(&mut first, 4, &pool, 3).unwrap();
        gaussian_blur(&mut second, 4, &rayon_pool, 0).unwrap();
        assert_eq!(first.data.borrow(), second.data.borrow());
    }
}
