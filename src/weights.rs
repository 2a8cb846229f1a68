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
use num_traits::{Float, FromPrimitive};

/// Integer weights of the stack blur window: `radius + 1 - |i|` for
/// `i` in `-radius..=radius`. They sum to `(radius + 1)^2`.
pub fn triangular_kernel(radius: usize) -> Vec<u32> {
    let r = radius as i64;
    (-r..=r).map(|i| (r + 1 - i.abs()) as u32).collect()
}

/// Normalized gaussian weights of size `2 * radius + 1` with
/// `sigma = radius / sigma_coefficient`.
///
/// Radius 0 yields the identity kernel `[1]`.
pub fn gaussian_kernel<F: Float + FromPrimitive>(radius: usize, sigma_coefficient: F) -> Vec<F> {
    if radius == 0 {
        return vec![F::one()];
    }
    let r = radius as i64;
    let sigma = F::from_usize(radius).unwrap_or(F::one()) / sigma_coefficient;
    let two_sigma_sq = sigma * sigma + sigma * sigma;
    let mut kernel: Vec<F> = (-r..=r)
        .map(|i| {
            let x = F::from_i64(i * i).unwrap_or(F::zero());
            (-x / two_sigma_sq).exp()
        })
        .collect();
    let sum = kernel.iter().fold(F::zero(), |acc, &w| acc + w);
    if sum != F::zero() {
        for weight in kernel.iter_mut() {
            *weight = *weight / sum;
        }
    }
    kernel
}

/// Sigma coefficient used by [crate::gaussian_blur]
pub const DEFAULT_SIGMA_COEFFICIENT: f32 = 2.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangular_kernel() {
        assert_eq!(triangular_kernel(0), vec![1]);
        assert_eq!(triangular_kernel(2), vec![1, 2, 3, 2, 1]);
        for radius in [1usize, 7, 254] {
            let sum: u32 = triangular_kernel(radius).iter().sum();
            assert_eq!(sum as usize, (radius + 1) * (radius + 1));
        }
    }

    #[test]
    fn test_gaussian_kernel_is_normalized_and_symmetric() {
        for radius in [1usize, 3, 10, 254] {
            let kernel = gaussian_kernel::<f32>(radius, DEFAULT_SIGMA_COEFFICIENT);
            assert_eq!(kernel.len(), radius * 2 + 1);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.).abs() < 1e-4, "radius {radius} sum {sum}");
            for i in 0..radius {
                assert_eq!(kernel[i], kernel[kernel.len() - 1 - i]);
                assert!(kernel[i] <= kernel[i + 1]);
            }
        }
        let kernel = gaussian_kernel::<f64>(5, 2.5);
        let sum: f64 = kernel.iter().sum();
        assert!((sum - 1.).abs() < 1e-12);
        assert_eq!(gaussian_kernel::<f64>(0, 2.5), vec![1.]);
    }
}
