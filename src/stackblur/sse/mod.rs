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
mod lanes;

use crate::stackblur::division_table::Divisor;
use crate::stackblur::line_view::LineSet;
use crate::stackblur::stack_blur_pass::blur_lines;
use crate::unsafe_slice::UnsafeSlice;
pub(crate) use lanes::{Sse2Lanes, Sse41Lanes};

#[target_feature(enable = "sse2")]
pub(crate) unsafe fn blur_lines_sse2<const CLOSED_FORM: bool>(
    pixels: UnsafeSlice<'_, u8>,
    lines: &LineSet,
    begin: usize,
    end: usize,
    radius: usize,
    divisor: &Divisor,
) {
    blur_lines::<Sse2Lanes, CLOSED_FORM>(pixels, lines, begin, end, radius, divisor);
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn blur_lines_sse41<const CLOSED_FORM: bool>(
    pixels: UnsafeSlice<'_, u8>,
    lines: &LineSet,
    begin: usize,
    end: usize,
    radius: usize,
    divisor: &Divisor,
) {
    blur_lines::<Sse41Lanes, CLOSED_FORM>(pixels, lines, begin, end, radius, divisor);
}
