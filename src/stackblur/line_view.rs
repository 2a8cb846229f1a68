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
use crate::unsafe_slice::UnsafeSlice;

/// One row or one column of the image seen as a 1-D run of pixels.
///
/// Reads and writes are clamped into `[0, len - 1]`, so asking for a pixel
/// before the start or past the end replicates the edge pixel.
#[derive(Copy, Clone)]
pub(crate) struct LineView<'a> {
    pixels: UnsafeSlice<'a, u8>,
    base: usize,
    len: usize,
    /// Distance between neighbouring pixels of the line, in bytes
    advance: usize,
}

impl<'a> LineView<'a> {
    /// SAFETY: `len` must be at least 1, the pixel at
    /// `base + (len - 1) * advance` must be in bounds, and no other thread may
    /// access pixels of this line while the view is alive.
    #[inline]
    pub unsafe fn new(pixels: UnsafeSlice<'a, u8>, base: usize, len: usize, advance: usize) -> Self {
        debug_assert!(len > 0);
        debug_assert!(base + (len - 1) * advance + PIXEL_SIZE <= pixels.len());
        LineView {
            pixels,
            base,
            len,
            advance,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    fn offset(&self, i: isize) -> usize {
        let i = i.clamp(0, self.len as isize - 1) as usize;
        self.base + i * self.advance
    }

    #[inline(always)]
    pub fn get(&self, i: isize) -> u32 {
        unsafe { self.pixels.read_pixel(self.offset(i)) }
    }

    #[inline(always)]
    pub fn set(&self, i: isize, value: u32) {
        unsafe { self.pixels.write_pixel(self.offset(i), value) }
    }
}

/// Every row, or every column, of an image.
#[derive(Copy, Clone, Debug)]
pub(crate) struct LineSet {
    /// Bytes between the first pixels of consecutive lines
    line_step: usize,
    line_len: usize,
    advance: usize,
    count: usize,
}

impl LineSet {
    pub fn rows(width: usize, height: usize, stride: usize) -> LineSet {
        LineSet {
            line_step: stride,
            line_len: width,
            advance: PIXEL_SIZE,
            count: height,
        }
    }

    pub fn columns(width: usize, height: usize, stride: usize) -> LineSet {
        LineSet {
            line_step: PIXEL_SIZE,
            line_len: height,
            advance: stride,
            count: width,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// SAFETY: image layout behind `pixels` must be validated for the
    /// geometry this set was built from, `index < count`, and the caller must
    /// own the line exclusively.
    #[inline]
    pub unsafe fn line<'a>(&self, pixels: UnsafeSlice<'a, u8>, index: usize) -> LineView<'a> {
        debug_assert!(index < self.count);
        LineView::new(pixels, index * self.line_step, self.line_len, self.advance)
    }
}
