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
use crate::stackblur::division_table::Divisor;
use std::ops::{AddAssign, Mul, SubAssign};

/// Four-lane running sum, one lane per channel.
///
/// Every implementation must produce the same pixels for the same input; they
/// differ only in how the lanes are stored and how the final division is done.
pub(crate) trait Accumulator: Copy + AddAssign + SubAssign + Mul<u32, Output = Self> {
    fn zero() -> Self;

    /// Unpacks the four bytes of a little-endian pixel into lanes
    fn from_pixel(pixel: u32) -> Self;

    /// Divides every lane by `divisor.den` and packs back to a pixel,
    /// saturating each lane into `[0, 255]`
    fn divide(self, divisor: &Divisor) -> u32;
}

/// Lanes kept in plain `u32` with the same multiply-shift division the vector
/// tiers use. Runs anywhere.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct PortableLanes([u32; 4]);

impl AddAssign for PortableLanes {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        for (dst, src) in self.0.iter_mut().zip(rhs.0.iter()) {
            *dst = dst.wrapping_add(*src);
        }
    }
}

impl SubAssign for PortableLanes {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        for (dst, src) in self.0.iter_mut().zip(rhs.0.iter()) {
            *dst = dst.wrapping_sub(*src);
        }
    }
}

impl Mul<u32> for PortableLanes {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: u32) -> Self::Output {
        PortableLanes(self.0.map(|x| x.wrapping_mul(rhs)))
    }
}

impl Accumulator for PortableLanes {
    #[inline(always)]
    fn zero() -> Self {
        PortableLanes([0; 4])
    }

    #[inline(always)]
    fn from_pixel(pixel: u32) -> Self {
        PortableLanes(pixel.to_le_bytes().map(u32::from))
    }

    #[inline(always)]
    fn divide(self, divisor: &Divisor) -> u32 {
        u32::from_le_bytes(self.0.map(|x| divisor.divide(x).min(255) as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stackblur::division_table::DIVISION_TABLE;
    use crate::stackblur::sliding_window::SlidingWindow;

    #[test]
    fn test_from_pixel_splits_channels() {
        let lanes = PortableLanes::from_pixel(0x80ff0102);
        assert_eq!(lanes, PortableLanes([0x02, 0x01, 0xff, 0x80]));
    }

    #[test]
    fn test_portable_matches_reference() {
        let pixels = [0x00000000u32, 0xffffffff, 0x7f80817e, 0x01020304, 0xdeadbeef];
        for radius in [1usize, 2, 7, 31, 254] {
            let divisor = &DIVISION_TABLE[radius];
            let mut lanes = PortableLanes::zero();
            let mut window = SlidingWindow::zero();
            for (i, &px) in pixels.iter().enumerate() {
                let weight = (i as u32 % (radius as u32 + 1)) + 1;
                lanes += PortableLanes::from_pixel(px) * weight;
                window += SlidingWindow::from_pixel(px) * weight;
            }
            assert_eq!(lanes.divide(divisor), window.divide(divisor));
            lanes -= PortableLanes::from_pixel(pixels[1]);
            window -= SlidingWindow::from_pixel(pixels[1]);
            assert_eq!(lanes.divide(divisor), window.divide(divisor));
        }
    }

    #[test]
    fn test_divide_saturates() {
        let lanes = PortableLanes([1000, 255, 0, 4 * 255]);
        assert_eq!(lanes.divide(&DIVISION_TABLE[1]), u32::from_le_bytes([250, 63, 0, 255]));
        let lanes = PortableLanes([300, 0, 0, 0]);
        assert_eq!(lanes.divide(&DIVISION_TABLE[0]), 255);
    }
}
