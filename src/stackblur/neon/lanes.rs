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
use std::arch::aarch64::*;
use std::ops::{AddAssign, Mul, SubAssign};

#[derive(Copy, Clone)]
pub(crate) struct NeonLanes(pub uint32x4_t);

impl AddAssign for NeonLanes {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = unsafe { vaddq_u32(self.0, rhs.0) };
    }
}

impl SubAssign for NeonLanes {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = unsafe { vsubq_u32(self.0, rhs.0) };
    }
}

impl Mul<u32> for NeonLanes {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: u32) -> Self::Output {
        NeonLanes(unsafe { vmulq_n_u32(self.0, rhs) })
    }
}

#[inline(always)]
unsafe fn mulhi(a: uint32x4_t, b: u32) -> uint32x4_t {
    let lo = vmull_n_u32(vget_low_u32(a), b);
    let hi = vmull_high_n_u32(a, b);
    vcombine_u32(vshrn_n_u64::<32>(lo), vshrn_n_u64::<32>(hi))
}

impl Accumulator for NeonLanes {
    #[inline(always)]
    fn zero() -> Self {
        NeonLanes(unsafe { vdupq_n_u32(0) })
    }

    #[inline(always)]
    fn from_pixel(pixel: u32) -> Self {
        unsafe {
            let bytes = vreinterpret_u8_u32(vdup_n_u32(pixel));
            NeonLanes(vmovl_u16(vget_low_u16(vmovl_u8(bytes))))
        }
    }

    #[inline(always)]
    fn divide(self, divisor: &Divisor) -> u32 {
        unsafe {
            let t = mulhi(self.0, divisor.mul);
            let shr1 = vdupq_n_s32(-(divisor.shr1 as i32));
            let shr2 = vdupq_n_s32(-(divisor.shr2 as i32));
            let q = vshlq_u32(vaddq_u32(t, vshlq_u32(vsubq_u32(self.0, t), shr1)), shr2);
            let words = vqmovn_u32(q);
            let bytes = vqmovn_u16(vcombine_u16(words, vdup_n_u16(0)));
            vget_lane_u32::<0>(vreinterpret_u32_u8(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stackblur::accumulator::PortableLanes;
    use crate::stackblur::division_table::DIVISION_TABLE;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn lanes_of(v: uint32x4_t) -> [u32; 4] {
        let mut out = [0u32; 4];
        unsafe { vst1q_u32(out.as_mut_ptr(), v) };
        out
    }

    #[test]
    fn test_unpack_and_multiply() {
        let v = NeonLanes::from_pixel(0x80ff0102) * 70000;
        assert_eq!(lanes_of(v.0), [2 * 70000, 70000, 255 * 70000, 128 * 70000]);
    }

    #[test]
    fn test_mulhi_matches_wide_multiply() {
        let mut rng = StdRng::seed_from_u64(41);
        for _ in 0..1000 {
            let a: [u32; 4] = rng.random();
            let b: u32 = rng.random();
            let expected = a.map(|x| ((x as u64 * b as u64) >> 32) as u32);
            let va = unsafe { vld1q_u32(a.as_ptr()) };
            assert_eq!(lanes_of(unsafe { mulhi(va, b) }), expected);
        }
    }

    #[test]
    fn test_lanes_match_portable() {
        let mut rng = StdRng::seed_from_u64(7);
        for radius in [1usize, 2, 5, 17, 100, 254] {
            let divisor = &DIVISION_TABLE[radius];
            for _ in 0..200 {
                let pixels: [u32; 6] = rng.random();
                let mut portable = PortableLanes::zero();
                let mut neon = NeonLanes::zero();
                for &px in pixels.iter() {
                    let w = rng.random_range(1..=radius as u32 + 1);
                    portable += PortableLanes::from_pixel(px) * w;
                    neon += NeonLanes::from_pixel(px) * w;
                }
                assert_eq!(neon.divide(divisor), portable.divide(divisor));
            }
        }
    }
}
