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
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;
use std::ops::{AddAssign, Mul, SubAssign};

/// Accumulator on baseline SSE2.
///
/// SSE2 has no 32-bit low multiply and no unsigned 32-bit pack, both are
/// emulated.
#[derive(Copy, Clone)]
pub(crate) struct Sse2Lanes(pub __m128i);

/// Accumulator using the SSE4.1 widening, multiply and pack instructions.
#[derive(Copy, Clone)]
pub(crate) struct Sse41Lanes(pub __m128i);

macro_rules! impl_lane_arithmetic {
    ($lanes: ident) => {
        impl AddAssign for $lanes {
            #[inline(always)]
            fn add_assign(&mut self, rhs: Self) {
                self.0 = unsafe { _mm_add_epi32(self.0, rhs.0) };
            }
        }

        impl SubAssign for $lanes {
            #[inline(always)]
            fn sub_assign(&mut self, rhs: Self) {
                self.0 = unsafe { _mm_sub_epi32(self.0, rhs.0) };
            }
        }

        impl Mul<u32> for $lanes {
            type Output = Self;

            #[inline(always)]
            fn mul(self, rhs: u32) -> Self::Output {
                $lanes(unsafe { $lanes::mullo(self.0, rhs) })
            }
        }

        impl Accumulator for $lanes {
            #[inline(always)]
            fn zero() -> Self {
                $lanes(unsafe { _mm_setzero_si128() })
            }

            #[inline(always)]
            fn from_pixel(pixel: u32) -> Self {
                $lanes(unsafe { $lanes::unpack(pixel) })
            }

            #[inline(always)]
            fn divide(self, divisor: &Divisor) -> u32 {
                unsafe {
                    let t = $lanes::mulhi(self.0, divisor.mul);
                    let shr1 = _mm_cvtsi32_si128(divisor.shr1 as i32);
                    let shr2 = _mm_cvtsi32_si128(divisor.shr2 as i32);
                    let q = _mm_srl_epi32(
                        _mm_add_epi32(t, _mm_srl_epi32(_mm_sub_epi32(self.0, t), shr1)),
                        shr2,
                    );
                    $lanes::pack(q)
                }
            }
        }
    };
}

impl_lane_arithmetic!(Sse2Lanes);
impl_lane_arithmetic!(Sse41Lanes);

impl Sse2Lanes {
    #[inline(always)]
    unsafe fn unpack(pixel: u32) -> __m128i {
        let zeros = _mm_setzero_si128();
        let v = _mm_cvtsi32_si128(pixel as i32);
        _mm_unpacklo_epi16(_mm_unpacklo_epi8(v, zeros), zeros)
    }

    #[inline(always)]
    unsafe fn mullo(a: __m128i, b: u32) -> __m128i {
        let vb = _mm_set1_epi32(b as i32);
        let even = _mm_mul_epu32(a, vb);
        let odd = _mm_mul_epu32(_mm_srli_epi64::<32>(a), vb);
        _mm_unpacklo_epi32(
            _mm_shuffle_epi32::<0b00_00_10_00>(even),
            _mm_shuffle_epi32::<0b00_00_10_00>(odd),
        )
    }

    /// High halves of the unsigned 32x32 products
    #[inline(always)]
    unsafe fn mulhi(a: __m128i, b: u32) -> __m128i {
        let vb = _mm_set1_epi32(b as i32);
        let even = _mm_srli_epi64::<32>(_mm_mul_epu32(a, vb));
        let odd = _mm_mul_epu32(_mm_srli_epi64::<32>(a), vb);
        let odd_mask = _mm_set_epi32(-1, 0, -1, 0);
        _mm_or_si128(even, _mm_and_si128(odd, odd_mask))
    }

    /// Signed 32->16 then unsigned 16->8 saturation.
    #[inline(always)]
    pub(crate) unsafe fn pack(v: __m128i) -> u32 {
        let words = _mm_packs_epi32(v, v);
        _mm_cvtsi128_si32(_mm_packus_epi16(words, words)) as u32
    }
}

impl Sse41Lanes {
    #[inline(always)]
    unsafe fn unpack(pixel: u32) -> __m128i {
        _mm_cvtepu8_epi32(_mm_cvtsi32_si128(pixel as i32))
    }

    #[inline(always)]
    unsafe fn mullo(a: __m128i, b: u32) -> __m128i {
        _mm_mullo_epi32(a, _mm_set1_epi32(b as i32))
    }

    #[inline(always)]
    unsafe fn mulhi(a: __m128i, b: u32) -> __m128i {
        let vb = _mm_set1_epi32(b as i32);
        let even = _mm_srli_epi64::<32>(_mm_mul_epu32(a, vb));
        let odd = _mm_mul_epu32(_mm_srli_epi64::<32>(a), vb);
        _mm_blend_epi16::<0xcc>(even, odd)
    }

    /// Unsigned 32->16 then unsigned 16->8 saturation.
    #[inline(always)]
    pub(crate) unsafe fn pack(v: __m128i) -> u32 {
        let words = _mm_packus_epi32(v, v);
        _mm_cvtsi128_si32(_mm_packus_epi16(words, words)) as u32
    }
}
