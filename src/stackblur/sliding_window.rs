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
use crate::stackblur::accumulator::Accumulator;
use crate::stackblur::division_table::Divisor;
use std::ops::{AddAssign, Mul, SubAssign};

/// Reference accumulator: one signed integer per channel and a true integer
/// division on output.
#[repr(C)]
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Copy, Default)]
pub(crate) struct SlidingWindow {
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub a: i32,
}

impl SlidingWindow {
    #[inline]
    pub fn from_components(r: i32, g: i32, b: i32, a: i32) -> SlidingWindow {
        SlidingWindow { r, g, b, a }
    }
}

impl Mul<u32> for SlidingWindow {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: u32) -> Self::Output {
        let rhs = rhs as i32;
        SlidingWindow::from_components(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl AddAssign<SlidingWindow> for SlidingWindow {
    #[inline]
    fn add_assign(&mut self, rhs: SlidingWindow) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
        self.a += rhs.a;
    }
}

impl SubAssign<SlidingWindow> for SlidingWindow {
    #[inline]
    fn sub_assign(&mut self, rhs: SlidingWindow) {
        self.r -= rhs.r;
        self.g -= rhs.g;
        self.b -= rhs.b;
        self.a -= rhs.a;
    }
}

impl Accumulator for SlidingWindow {
    #[inline]
    fn zero() -> Self {
        SlidingWindow::default()
    }

    #[inline]
    fn from_pixel(pixel: u32) -> Self {
        let [r, g, b, a] = pixel.to_le_bytes();
        SlidingWindow::from_components(r as i32, g as i32, b as i32, a as i32)
    }

    #[inline]
    fn divide(self, divisor: &Divisor) -> u32 {
        let den = divisor.den as i32;
        let cn = |v: i32| (v / den).clamp(0, 255) as u8;
        u32::from_le_bytes([cn(self.r), cn(self.g), cn(self.b), cn(self.a)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stackblur::division_table::DIVISION_TABLE;

    #[test]
    fn test_arithmetic() {
        let mut window = SlidingWindow::from_pixel(0x04030201) * 3;
        assert_eq!(window, SlidingWindow::from_components(3, 6, 9, 12));
        window += SlidingWindow::from_pixel(0x01010101);
        window -= SlidingWindow::from_pixel(0x00000100);
        assert_eq!(window, SlidingWindow::from_components(4, 6, 10, 13));
        assert_eq!(
            window.divide(&DIVISION_TABLE[1]),
            u32::from_le_bytes([1, 1, 2, 3])
        );
    }
}
