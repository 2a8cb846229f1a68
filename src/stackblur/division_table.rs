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
use crate::MAX_RADIUS;

/// Multiply-shift replacement for dividing by `den = (radius + 1)^2`.
///
/// `q = (t + ((x - t) >> shr1)) >> shr2` where `t = (x * mul) >> 32`
/// equals `x / den` for every `u32` value of `x`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Divisor {
    pub den: u32,
    pub mul: u32,
    pub shr1: u8,
    pub shr2: u8,
}

impl Divisor {
    pub const fn new(den: u32) -> Divisor {
        assert!(den > 0);
        // ceil(log2(den))
        let l = if den <= 1 {
            0
        } else {
            32 - (den - 1).leading_zeros()
        };
        let l2 = 1u64 << l;
        let mul = (((l2 - den as u64) << 32) / den as u64 + 1) as u32;
        Divisor {
            den,
            mul,
            shr1: if l > 0 { 1 } else { 0 },
            shr2: if l > 0 { (l - 1) as u8 } else { 0 },
        }
    }

    /// Normalization divisor of the triangular window with given radius
    #[inline]
    pub const fn for_radius(radius: usize) -> Divisor {
        let r = radius as u32;
        Divisor::new(r * (r + 2) + 1)
    }

    #[inline(always)]
    pub const fn divide(&self, x: u32) -> u32 {
        let t = ((x as u64 * self.mul as u64) >> 32) as u32;
        (t + ((x - t) >> self.shr1)) >> self.shr2
    }
}

const fn build_table() -> [Divisor; MAX_RADIUS + 1] {
    let mut table = [Divisor::new(1); MAX_RADIUS + 1];
    let mut radius = 0;
    while radius <= MAX_RADIUS {
        table[radius] = Divisor::for_radius(radius);
        radius += 1;
    }
    table
}

/// Divisors for every radius in `0..=MAX_RADIUS`
pub static DIVISION_TABLE: [Divisor; MAX_RADIUS + 1] = build_table();

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_den_is_triangular_sum() {
        for (radius, divisor) in DIVISION_TABLE.iter().enumerate() {
            let r = radius as u32;
            assert_eq!(divisor.den, (r + 1) * (r + 1));
            assert_eq!(divisor.den, r * (r + 2) + 1);
        }
    }

    #[test]
    fn test_divisor_exact_on_boundaries() {
        for divisor in DIVISION_TABLE.iter() {
            let den = divisor.den;
            let max = 255 * den;
            for x in [
                0,
                1,
                den - 1,
                den,
                den + 1,
                2 * den - 1,
                max - 1,
                max,
                max + 1,
                u32::MAX - 1,
                u32::MAX,
            ] {
                assert_eq!(divisor.divide(x), x / den, "x={x}, den={den}");
            }
        }
    }

    #[test]
    fn test_divisor_exhaustive_small_radii() {
        for divisor in DIVISION_TABLE.iter().take(9) {
            for x in 0..=255 * divisor.den {
                assert_eq!(divisor.divide(x), x / divisor.den);
            }
        }
    }

    #[test]
    fn test_divisor_random_values() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for divisor in DIVISION_TABLE.iter() {
            for _ in 0..2000 {
                let x = rng.random_range(0..=255 * divisor.den);
                assert_eq!(divisor.divide(x), x / divisor.den);
            }
        }
    }

    #[test]
    fn test_known_entries() {
        assert_eq!(
            DIVISION_TABLE[0],
            Divisor {
                den: 1,
                mul: 1,
                shr1: 0,
                shr2: 0
            }
        );
        assert_eq!(DIVISION_TABLE[1].den, 4);
        assert_eq!(DIVISION_TABLE[1].mul, 1);
        assert_eq!(DIVISION_TABLE[1].shr2, 1);
        assert_eq!(DIVISION_TABLE[254].den, 65025);
        assert_eq!(DIVISION_TABLE[254].shr2, 15);
    }
}
